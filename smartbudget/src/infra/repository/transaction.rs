use crate::domain::filter::{Condition, TransactionPredicate};
use crate::domain::models::{NewTransaction, Transaction, TransactionKind, TransactionPatch};
use crate::domain::repository;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Pool, Postgres, QueryBuilder, Row};

const COLUMNS: &str =
    "id, user_id, kind, amount, label, description, date, is_recurring, recurrence, next_occurrence";

#[derive(Clone)]
pub struct PgTransactionRepository {
    pub pool: Pool<Postgres>,
}

impl PgTransactionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PgTransactionRepository { pool }
    }
}

impl<'r> FromRow<'r, PgRow> for Transaction {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let kind: String = row.try_get("kind")?;
        let kind = kind
            .parse::<TransactionKind>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "kind".to_string(),
                source: Box::new(e),
            })?;

        Ok(Transaction {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            kind,
            amount: row.try_get("amount")?,
            label: row.try_get("label")?,
            description: row.try_get("description")?,
            date: row.try_get("date")?,
            is_recurring: row.try_get("is_recurring")?,
            recurrence: row.try_get("recurrence")?,
            next_occurrence: row.try_get("next_occurrence")?,
        })
    }
}

/// Appends the `WHERE` clause for `predicate`, one bind parameter per value.
pub(crate) fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, predicate: &TransactionPredicate) {
    qb.push(" WHERE user_id = ").push_bind(predicate.user_id());
    qb.push(" AND kind = ").push_bind(predicate.kind().as_str());

    for condition in predicate.conditions() {
        match condition {
            Condition::LabelIs(label) => qb.push(" AND label = ").push_bind(label.clone()),
            Condition::AmountAtLeast(min) => qb.push(" AND amount >= ").push_bind(*min),
            Condition::AmountAtMost(max) => qb.push(" AND amount <= ").push_bind(*max),
            Condition::DateFrom(from) => qb.push(" AND date >= ").push_bind(*from),
            Condition::DateTo(to) => qb.push(" AND date <= ").push_bind(*to),
            Condition::RecurringIs(flag) => qb.push(" AND is_recurring = ").push_bind(*flag),
            Condition::RecurrenceIs(recurrence) => {
                qb.push(" AND recurrence = ").push_bind(recurrence.clone())
            }
        };
    }
}

#[async_trait]
impl repository::TransactionRepository for PgTransactionRepository {
    async fn insert(&self, tx: NewTransaction) -> anyhow::Result<Transaction> {
        let sql = format!(
            "INSERT INTO transactions \
             (user_id, kind, amount, label, description, date, is_recurring, recurrence, next_occurrence) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Transaction>(&sql)
            .bind(tx.user_id)
            .bind(tx.kind.as_str())
            .bind(tx.amount)
            .bind(&tx.label)
            .bind(&tx.description)
            .bind(tx.date)
            .bind(tx.is_recurring)
            .bind(&tx.recurrence)
            .bind(tx.next_occurrence)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find(&self, predicate: &TransactionPredicate) -> anyhow::Result<Vec<Transaction>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM transactions"));
        push_predicate(&mut qb, predicate);
        qb.push(" ORDER BY date DESC, id DESC");

        let rows = qb
            .build_query_as::<Transaction>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn recent(
        &self,
        user_id: i64,
        kind: TransactionKind,
        limit: i64,
    ) -> anyhow::Result<Vec<Transaction>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM transactions WHERE user_id = $1 AND kind = $2 \
             ORDER BY date DESC, id DESC LIMIT $3"
        );
        let rows = sqlx::query_as::<_, Transaction>(&sql)
            .bind(user_id)
            .bind(kind.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn update(
        &self,
        user_id: i64,
        kind: TransactionKind,
        id: i64,
        patch: TransactionPatch,
    ) -> anyhow::Result<Option<Transaction>> {
        if patch.is_empty() {
            return Ok(None);
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE transactions SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(amount) = patch.amount {
                set.push("amount = ").push_bind_unseparated(amount);
            }
            if let Some(label) = patch.label {
                set.push("label = ").push_bind_unseparated(label);
            }
            if let Some(description) = patch.description {
                set.push("description = ").push_bind_unseparated(description);
            }
            if let Some(date) = patch.date {
                set.push("date = ").push_bind_unseparated(date);
            }
            if let Some(is_recurring) = patch.is_recurring {
                set.push("is_recurring = ").push_bind_unseparated(is_recurring);
            }
            if let Some(recurrence) = patch.recurrence {
                set.push("recurrence = ").push_bind_unseparated(recurrence);
            }
            if let Some(next_occurrence) = patch.next_occurrence {
                set.push("next_occurrence = ").push_bind_unseparated(next_occurrence);
            }
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" AND user_id = ").push_bind(user_id);
        qb.push(" AND kind = ").push_bind(kind.as_str());
        qb.push(format!(" RETURNING {COLUMNS}"));

        let row = qb
            .build_query_as::<Transaction>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, user_id: i64, kind: TransactionKind, id: i64) -> anyhow::Result<bool> {
        let result =
            sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2 AND kind = $3")
                .bind(id)
                .bind(user_id)
                .bind(kind.as_str())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn labels(&self, user_id: i64, kind: TransactionKind) -> anyhow::Result<Vec<String>> {
        let labels = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT label FROM transactions WHERE user_id = $1 AND kind = $2 ORDER BY label",
        )
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::{build_predicate, TransactionQuery};

    fn render(predicate: &TransactionPredicate) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM transactions");
        push_predicate(&mut qb, predicate);
        qb.sql().to_string()
    }

    #[test]
    fn user_scope_is_always_rendered() {
        let predicate = TransactionPredicate::for_user(1, TransactionKind::Expense);
        assert_eq!(
            render(&predicate),
            "SELECT id FROM transactions WHERE user_id = $1 AND kind = $2"
        );
    }

    #[test]
    fn every_condition_gets_its_own_parameter() {
        let query = TransactionQuery {
            category: Some("Food".to_string()),
            min_amount: Some("10".to_string()),
            max_amount: Some("5".to_string()),
            start_date: Some("2024-01-01".to_string()),
            end_date: Some("garbage".to_string()),
            is_recurring: Some("true".to_string()),
            recurrence: Some("monthly".to_string()),
            ..Default::default()
        };
        let predicate = build_predicate(1, TransactionKind::Expense, &query);
        assert_eq!(
            render(&predicate),
            "SELECT id FROM transactions WHERE user_id = $1 AND kind = $2 \
             AND label = $3 AND amount >= $4 AND amount <= $5 AND date >= $6 \
             AND is_recurring = $7 AND recurrence = $8"
        );
    }
}
