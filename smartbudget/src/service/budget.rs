use crate::domain::filter::TransactionPredicate;
use crate::domain::models::{Budget, BudgetPeriod, NewBudget, TransactionKind};
use crate::domain::repository::{BudgetRepository, TransactionRepository};
use crate::domain::summary::{summarize, Summary};
use crate::service::input::{self, AmountInput};
use crate::service::AppError;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetInput {
    pub category: Option<String>,
    pub period: Option<String>,
    pub amount: Option<AmountInput>,
}

pub struct BudgetService {
    budget_repo: Arc<dyn BudgetRepository>,
    tx_repo: Arc<dyn TransactionRepository>,
}

impl BudgetService {
    pub fn new(
        budget_repo: Arc<dyn BudgetRepository>,
        tx_repo: Arc<dyn TransactionRepository>,
    ) -> BudgetService {
        BudgetService {
            budget_repo,
            tx_repo,
        }
    }

    /// Creates the budget or replaces the amount of the existing one for the
    /// same category and period.
    pub async fn set_budget(&self, user_id: i64, body: BudgetInput) -> Result<Budget, AppError> {
        let amount = input::amount(&body.amount)?.filter(|a| *a > 0.0);
        let (Some(category), Some(amount)) = (input::text(&body.category), amount) else {
            return Err(AppError::Validation(
                "Category and amount required".to_string(),
            ));
        };
        let period = match input::text(&body.period) {
            Some(raw) => raw
                .parse::<BudgetPeriod>()
                .map_err(|e| AppError::Validation(e.to_string()))?,
            None => BudgetPeriod::default(),
        };

        let budget = self
            .budget_repo
            .upsert(NewBudget {
                user_id,
                category,
                period,
                amount,
            })
            .await?;
        log::info!(user_id = user_id, category = budget.category.as_str(), period = period.as_str(); "Budget set");
        Ok(budget)
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<Budget>, AppError> {
        Ok(self.budget_repo.list(user_id, None).await?)
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<(), AppError> {
        if !self.budget_repo.delete(user_id, id).await? {
            return Err(AppError::NotFound("Budget"));
        }
        Ok(())
    }

    /// Totals span the whole history while budgets are the monthly ones.
    pub async fn summary(&self, user_id: i64) -> Result<Summary, AppError> {
        let income_filter = TransactionPredicate::for_user(user_id, TransactionKind::Income);
        let expense_filter = TransactionPredicate::for_user(user_id, TransactionKind::Expense);

        let (income, expenses, budgets) = tokio::try_join!(
            self.tx_repo.find(&income_filter),
            self.tx_repo.find(&expense_filter),
            self.budget_repo.list(user_id, Some(BudgetPeriod::Monthly)),
        )?;

        let summary = summarize(&income, &expenses, &budgets);
        if !summary.alerts.is_empty() {
            log::debug!(user_id = user_id, alerts = summary.alerts.len(); "Budget alerts raised");
        }
        Ok(summary)
    }
}
