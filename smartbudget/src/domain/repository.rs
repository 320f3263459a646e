use crate::domain::filter::TransactionPredicate;
use crate::domain::models::*;
use async_trait::async_trait;
use thiserror::Error;

/// Returned by `create_user` when the username is already stored.
#[derive(Debug, Error)]
#[error("username already taken")]
pub struct UsernameTaken;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// `password` is the already hashed credential. Fails with
    /// [`UsernameTaken`] when the name exists.
    async fn create_user(&self, username: String, password: String) -> anyhow::Result<User>;
    async fn find(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert(&self, tx: NewTransaction) -> anyhow::Result<Transaction>;
    /// Matching records, newest first.
    async fn find(&self, predicate: &TransactionPredicate) -> anyhow::Result<Vec<Transaction>>;
    async fn recent(
        &self,
        user_id: i64,
        kind: TransactionKind,
        limit: i64,
    ) -> anyhow::Result<Vec<Transaction>>;
    /// `None` when no record with this id belongs to the user.
    async fn update(
        &self,
        user_id: i64,
        kind: TransactionKind,
        id: i64,
        patch: TransactionPatch,
    ) -> anyhow::Result<Option<Transaction>>;
    async fn delete(&self, user_id: i64, kind: TransactionKind, id: i64) -> anyhow::Result<bool>;
    /// Distinct categories (expenses) or sources (income) in use.
    async fn labels(&self, user_id: i64, kind: TransactionKind) -> anyhow::Result<Vec<String>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BudgetRepository: Send + Sync {
    /// Inserts, or replaces the amount of the budget with the same
    /// `(user_id, category, period)`.
    async fn upsert(&self, budget: NewBudget) -> anyhow::Result<Budget>;
    async fn list(&self, user_id: i64, period: Option<BudgetPeriod>) -> anyhow::Result<Vec<Budget>>;
    async fn delete(&self, user_id: i64, id: i64) -> anyhow::Result<bool>;
}
