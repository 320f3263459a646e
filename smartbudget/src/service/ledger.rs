use crate::domain::filter::{build_predicate, TransactionPredicate, TransactionQuery};
use crate::domain::models::{NewTransaction, Transaction, TransactionKind, TransactionPatch};
use crate::domain::repository::TransactionRepository;
use crate::infra::export::transactions_csv;
use crate::service::input::{self, AmountInput};
use crate::service::AppError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const RECENT_LIMIT: i64 = 5;

/// Request body for creating or updating income and expenses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionInput {
    pub amount: Option<AmountInput>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub is_recurring: Option<bool>,
    pub recurrence: Option<String>,
    pub next_occurrence: Option<String>,
}

impl TransactionInput {
    fn label(&self, kind: TransactionKind) -> Option<String> {
        match kind {
            TransactionKind::Expense => input::text(&self.category),
            TransactionKind::Income => input::text(&self.source),
        }
    }

    fn description(&self, kind: TransactionKind) -> Option<String> {
        match kind {
            TransactionKind::Expense => self.description.clone(),
            TransactionKind::Income => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecentTransactions {
    pub income: Vec<Transaction>,
    pub expenses: Vec<Transaction>,
}

pub struct LedgerService {
    tx_repo: Arc<dyn TransactionRepository>,
}

impl LedgerService {
    pub fn new(tx_repo: Arc<dyn TransactionRepository>) -> LedgerService {
        LedgerService { tx_repo }
    }

    pub async fn add(
        &self,
        user_id: i64,
        kind: TransactionKind,
        body: TransactionInput,
    ) -> Result<Transaction, AppError> {
        let amount = input::amount(&body.amount)?.filter(|a| *a != 0.0);
        let (Some(amount), Some(label)) = (amount, body.label(kind)) else {
            return Err(AppError::Validation(format!(
                "Amount and {} required",
                kind.label_name()
            )));
        };

        let tx = self
            .tx_repo
            .insert(NewTransaction {
                user_id,
                kind,
                amount,
                label,
                description: body.description(kind),
                date: input::timestamp(&body.date)?.unwrap_or_else(Utc::now),
                is_recurring: body.is_recurring.unwrap_or(false),
                recurrence: input::text(&body.recurrence),
                next_occurrence: input::timestamp(&body.next_occurrence)?,
            })
            .await?;

        log::info!(user_id = user_id, kind = kind.as_str(), id = tx.id; "Transaction added");
        Ok(tx)
    }

    pub async fn list(
        &self,
        user_id: i64,
        kind: TransactionKind,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, AppError> {
        let predicate = build_predicate(user_id, kind, query);
        log::debug!(user_id = user_id, conditions = predicate.conditions().len(); "Searching transactions");
        Ok(self.tx_repo.find(&predicate).await?)
    }

    pub async fn update(
        &self,
        user_id: i64,
        kind: TransactionKind,
        id: i64,
        body: TransactionInput,
    ) -> Result<Transaction, AppError> {
        let patch = TransactionPatch {
            amount: input::amount(&body.amount)?,
            label: body.label(kind),
            description: body.description(kind),
            date: input::timestamp(&body.date)?,
            is_recurring: body.is_recurring,
            recurrence: input::text(&body.recurrence),
            next_occurrence: input::timestamp(&body.next_occurrence)?,
        };
        if patch.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }

        let tx = self
            .tx_repo
            .update(user_id, kind, id, patch)
            .await?
            .ok_or(AppError::NotFound(kind.title()))?;
        log::info!(user_id = user_id, kind = kind.as_str(), id = id; "Transaction updated");
        Ok(tx)
    }

    pub async fn delete(&self, user_id: i64, kind: TransactionKind, id: i64) -> Result<(), AppError> {
        if !self.tx_repo.delete(user_id, kind, id).await? {
            return Err(AppError::NotFound(kind.title()));
        }
        log::info!(user_id = user_id, kind = kind.as_str(), id = id; "Transaction deleted");
        Ok(())
    }

    pub async fn recent(&self, user_id: i64) -> Result<RecentTransactions, AppError> {
        let (income, expenses) = tokio::try_join!(
            self.tx_repo.recent(user_id, TransactionKind::Income, RECENT_LIMIT),
            self.tx_repo.recent(user_id, TransactionKind::Expense, RECENT_LIMIT),
        )?;
        Ok(RecentTransactions { income, expenses })
    }

    pub async fn labels(&self, user_id: i64, kind: TransactionKind) -> Result<Vec<String>, AppError> {
        Ok(self.tx_repo.labels(user_id, kind).await?)
    }

    pub async fn export(&self, user_id: i64, kind: TransactionKind) -> Result<Vec<u8>, AppError> {
        let rows = self
            .tx_repo
            .find(&TransactionPredicate::for_user(user_id, kind))
            .await?;
        Ok(transactions_csv(kind, &rows)?)
    }
}
