use crate::domain::models::{Budget, Transaction};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgress {
    pub category: String,
    pub budget: f64,
    pub spent: f64,
    pub over_under: f64,
    pub alert: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetAlert {
    pub category: String,
    pub message: String,
    pub over_by: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Summary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
    pub budget_progress: Vec<BudgetProgress>,
    pub alerts: Vec<BudgetAlert>,
}

/// Sum of expense amounts per category, keyed in lexical order.
pub fn category_totals(expenses: &[Transaction]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for expense in expenses {
        *totals.entry(expense.label.clone()).or_insert(0.0) += expense.amount;
    }
    totals
}

/// Builds the dashboard summary over the full income and expense history.
///
/// `budgets` are expected to be the user's monthly budgets. Every budget gets
/// one progress entry, in the order given; each spending category without a
/// budget is then appended with a zero budget, so a category never shows up
/// twice.
pub fn summarize(income: &[Transaction], expenses: &[Transaction], budgets: &[Budget]) -> Summary {
    let total_income = income.iter().fold(0.0, |acc, t| acc + t.amount);
    let total_expenses = expenses.iter().fold(0.0, |acc, t| acc + t.amount);
    let totals = category_totals(expenses);

    let mut budget_progress = Vec::with_capacity(budgets.len() + totals.len());
    let mut alerts = Vec::new();
    let mut budgeted: HashSet<&str> = HashSet::with_capacity(budgets.len());

    for budget in budgets {
        budgeted.insert(budget.category.as_str());
        let spent = totals.get(&budget.category).copied().unwrap_or(0.0);
        let over_under = spent - budget.amount;
        let alert = over_under > 0.0;
        if alert {
            alerts.push(BudgetAlert {
                category: budget.category.clone(),
                message: format!("Over budget by {:.2}", over_under),
                over_by: over_under,
            });
        }
        budget_progress.push(BudgetProgress {
            category: budget.category.clone(),
            budget: budget.amount,
            spent,
            over_under,
            alert,
        });
    }

    for (category, &spent) in totals.iter() {
        if budgeted.contains(category.as_str()) {
            continue;
        }
        let alert = spent > 0.0;
        if alert {
            alerts.push(BudgetAlert {
                category: category.clone(),
                message: format!("No budget set. Spent {:.2}", spent),
                over_by: spent,
            });
        }
        budget_progress.push(BudgetProgress {
            category: category.clone(),
            budget: 0.0,
            spent,
            over_under: spent,
            alert,
        });
    }

    Summary {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        budget_progress,
        alerts,
    }
}
