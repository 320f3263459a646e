use crate::domain::models::{Budget, BudgetPeriod, NewBudget};
use crate::domain::repository;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Pool, Postgres, Row};

#[derive(Clone)]
pub struct PgBudgetRepository {
    pub pool: Pool<Postgres>,
}

impl PgBudgetRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PgBudgetRepository { pool }
    }
}

impl<'r> FromRow<'r, PgRow> for Budget {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let period: String = row.try_get("period")?;
        let period = period
            .parse::<BudgetPeriod>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "period".to_string(),
                source: Box::new(e),
            })?;

        Ok(Budget {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            category: row.try_get("category")?,
            period,
            amount: row.try_get("amount")?,
        })
    }
}

#[async_trait]
impl repository::BudgetRepository for PgBudgetRepository {
    async fn upsert(&self, budget: NewBudget) -> anyhow::Result<Budget> {
        let row = sqlx::query_as::<_, Budget>(
            "INSERT INTO budgets (user_id, category, period, amount) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, category, period) DO UPDATE SET amount = EXCLUDED.amount \
             RETURNING id, user_id, category, period, amount",
        )
        .bind(budget.user_id)
        .bind(&budget.category)
        .bind(budget.period.as_str())
        .bind(budget.amount)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list(&self, user_id: i64, period: Option<BudgetPeriod>) -> anyhow::Result<Vec<Budget>> {
        let rows = sqlx::query_as::<_, Budget>(
            "SELECT id, user_id, category, period, amount FROM budgets \
             WHERE user_id = $1 AND ($2::text IS NULL OR period = $2) \
             ORDER BY category, period",
        )
        .bind(user_id)
        .bind(period.map(|p| p.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete(&self, user_id: i64, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
