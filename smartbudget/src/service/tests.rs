#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use crate::domain::filter::{Condition, TransactionQuery};
    use crate::domain::models::*;
    use crate::domain::repository::{
        MockBudgetRepository, MockTransactionRepository, MockUserRepository, UsernameTaken,
    };
    use crate::infra::auth::password::hash_password;
    use crate::service::account::AccountService;
    use crate::service::budget::{BudgetInput, BudgetService};
    use crate::service::input::AmountInput;
    use crate::service::ledger::{LedgerService, TransactionInput};
    use crate::service::AppError;
    use anyhow::Result;
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn user(password: &str) -> User {
        User {
            id: 1,
            username: "alex".to_string(),
            password: hash_password(password).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn tx(kind: TransactionKind, label: &str, amount: f64) -> Transaction {
        Transaction {
            id: 10,
            user_id: 1,
            kind,
            amount,
            label: label.to_string(),
            description: None,
            date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            is_recurring: false,
            recurrence: None,
            next_occurrence: None,
        }
    }

    #[tokio::test]
    async fn test_service_login() -> Result<()> {
        let stored = user("my_password");
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_username()
            .with(eq("alex"))
            .returning(move |_| Ok(Some(stored.clone())))
            .times(2);
        user_repo
            .expect_find_by_username()
            .with(eq("nobody"))
            .returning(|_| Ok(None));

        let account_service = AccountService::new(Arc::new(user_repo));
        let logged_user = account_service
            .login("alex".to_string(), "my_password".to_string())
            .await;
        assert!(logged_user.is_ok());

        let logged_user = account_service
            .login("alex".to_string(), "wrong password".to_string())
            .await;
        assert!(matches!(logged_user, Err(AppError::WrongPassword)));

        let logged_user = account_service
            .login("nobody".to_string(), "my_password".to_string())
            .await;
        assert!(matches!(logged_user, Err(AppError::WrongPassword)));

        Ok(())
    }

    #[tokio::test]
    async fn test_service_register_hashes_password() -> Result<()> {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_username()
            .with(eq("alex"))
            .return_once(|_| Ok(None));
        user_repo
            .expect_create_user()
            .withf(|name, password| name == "alex" && password.starts_with("$argon2"))
            .return_once(|name, password| {
                Ok(User {
                    id: 5,
                    username: name,
                    password,
                    created_at: Utc::now(),
                })
            })
            .times(1);

        let account_service = AccountService::new(Arc::new(user_repo));
        let created = account_service
            .create_user(" alex ".to_string(), "123".to_string())
            .await?;
        assert_eq!(created.id, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_service_register_rejects_taken_name() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_username()
            .returning(|_| Ok(Some(user("123"))));
        user_repo.expect_create_user().never();

        let account_service = AccountService::new(Arc::new(user_repo));
        let result = account_service
            .create_user("alex".to_string(), "123".to_string())
            .await;
        assert!(matches!(result, Err(AppError::UserExists)));

        let result = account_service
            .create_user("".to_string(), "123".to_string())
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_service_register_conflict_on_insert() {
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_username().returning(|_| Ok(None));
        user_repo
            .expect_create_user()
            .returning(|_, _| Err(anyhow::Error::new(UsernameTaken)))
            .times(1);

        let account_service = AccountService::new(Arc::new(user_repo));
        let result = account_service
            .create_user("alex".to_string(), "123".to_string())
            .await;
        assert!(matches!(result, Err(AppError::UserExists)));
    }

    #[tokio::test]
    async fn test_ledger_add_defaults_and_validation() -> Result<()> {
        let mut tx_repo = MockTransactionRepository::new();
        tx_repo
            .expect_insert()
            .withf(|new| {
                new.user_id == 1
                    && new.kind == TransactionKind::Income
                    && new.amount == 250.0
                    && new.label == "Salary"
                    && new.description.is_none()
                    && !new.is_recurring
            })
            .returning(|new| {
                let mut stored = tx(new.kind, &new.label, new.amount);
                stored.date = new.date;
                Ok(stored)
            })
            .times(1);

        let ledger = LedgerService::new(Arc::new(tx_repo));
        let body = TransactionInput {
            amount: Some(AmountInput::Text("250".to_string())),
            source: Some("Salary".to_string()),
            description: Some("ignored for income".to_string()),
            ..Default::default()
        };
        let before = Utc::now();
        let added = ledger.add(1, TransactionKind::Income, body).await?;
        assert!(added.date >= before);

        let missing_label = TransactionInput {
            amount: Some(AmountInput::Number(10.0)),
            source: Some("Salary".to_string()),
            ..Default::default()
        };
        let err = ledger
            .add(1, TransactionKind::Expense, missing_label)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Amount and category required");

        let zero_amount = TransactionInput {
            amount: Some(AmountInput::Number(0.0)),
            category: Some("Food".to_string()),
            ..Default::default()
        };
        assert!(ledger.add(1, TransactionKind::Expense, zero_amount).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_ledger_list_builds_scoped_predicate() -> Result<()> {
        let mut tx_repo = MockTransactionRepository::new();
        tx_repo
            .expect_find()
            .withf(|predicate| {
                predicate.user_id() == 3
                    && predicate.kind() == TransactionKind::Expense
                    && predicate.conditions()
                        == [Condition::AmountAtLeast(10.0), Condition::AmountAtMost(5.0)]
            })
            .returning(|_| Ok(vec![]))
            .times(1);

        let ledger = LedgerService::new(Arc::new(tx_repo));
        let query = TransactionQuery {
            min_amount: Some("10".to_string()),
            max_amount: Some("5".to_string()),
            start_date: Some("soon".to_string()),
            ..Default::default()
        };
        assert!(ledger.list(3, TransactionKind::Expense, &query).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_ledger_update_and_delete_report_missing_records() {
        let mut tx_repo = MockTransactionRepository::new();
        tx_repo.expect_update().returning(|_, _, _, _| Ok(None));
        tx_repo
            .expect_delete()
            .with(eq(1), eq(TransactionKind::Expense), eq(99))
            .returning(|_, _, _| Ok(false));

        let ledger = LedgerService::new(Arc::new(tx_repo));

        let err = ledger
            .update(1, TransactionKind::Income, 99, TransactionInput::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No fields to update");

        let body = TransactionInput {
            amount: Some(AmountInput::Number(5.0)),
            ..Default::default()
        };
        let err = ledger
            .update(1, TransactionKind::Income, 99, body)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Income not found");

        let err = ledger
            .delete(1, TransactionKind::Expense, 99)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Expense not found");
    }

    #[tokio::test]
    async fn test_ledger_export_writes_csv() -> Result<()> {
        let mut tx_repo = MockTransactionRepository::new();
        tx_repo
            .expect_find()
            .withf(|predicate| predicate.conditions().is_empty())
            .returning(|_| Ok(vec![tx(TransactionKind::Income, "Salary", 1000.0)]));

        let ledger = LedgerService::new(Arc::new(tx_repo));
        let csv = String::from_utf8(ledger.export(1, TransactionKind::Income).await?)?;
        assert!(csv.starts_with("Source,Amount,Date\nSalary,1000,"));
        Ok(())
    }

    #[tokio::test]
    async fn test_ledger_recent_takes_five_of_each() -> Result<()> {
        let mut tx_repo = MockTransactionRepository::new();
        tx_repo
            .expect_recent()
            .with(eq(1), eq(TransactionKind::Income), eq(5))
            .returning(|_, _, _| Ok(vec![tx(TransactionKind::Income, "Salary", 1000.0)]))
            .times(1);
        tx_repo
            .expect_recent()
            .with(eq(1), eq(TransactionKind::Expense), eq(5))
            .returning(|_, _, _| Ok(vec![]))
            .times(1);

        let ledger = LedgerService::new(Arc::new(tx_repo));
        let recent = ledger.recent(1).await?;
        assert_eq!(recent.income.len(), 1);
        assert!(recent.expenses.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_budget_set_validates_and_upserts() -> Result<()> {
        let mut budget_repo = MockBudgetRepository::new();
        budget_repo
            .expect_upsert()
            .with(eq(NewBudget {
                user_id: 1,
                category: "Food".to_string(),
                period: BudgetPeriod::Monthly,
                amount: 100.0,
            }))
            .returning(|new| {
                Ok(Budget {
                    id: 7,
                    user_id: new.user_id,
                    category: new.category,
                    period: new.period,
                    amount: new.amount,
                })
            })
            .times(1);

        let service = BudgetService::new(
            Arc::new(budget_repo),
            Arc::new(MockTransactionRepository::new()),
        );
        let budget = service
            .set_budget(
                1,
                BudgetInput {
                    category: Some("Food".to_string()),
                    period: None,
                    amount: Some(AmountInput::Text("100".to_string())),
                },
            )
            .await?;
        assert_eq!(budget.id, 7);

        let bad_period = BudgetInput {
            category: Some("Food".to_string()),
            period: Some("weekly".to_string()),
            amount: Some(AmountInput::Number(10.0)),
        };
        assert!(matches!(
            service.set_budget(1, bad_period).await,
            Err(AppError::Validation(_))
        ));

        let negative = BudgetInput {
            category: Some("Food".to_string()),
            period: None,
            amount: Some(AmountInput::Number(-10.0)),
        };
        assert!(matches!(
            service.set_budget(1, negative).await,
            Err(AppError::Validation(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_budget_summary_uses_monthly_budgets() -> Result<()> {
        let mut tx_repo = MockTransactionRepository::new();
        tx_repo
            .expect_find()
            .withf(|p| p.kind() == TransactionKind::Income)
            .returning(|_| Ok(vec![tx(TransactionKind::Income, "Salary", 1000.0)]));
        tx_repo
            .expect_find()
            .withf(|p| p.kind() == TransactionKind::Expense)
            .returning(|_| {
                Ok(vec![
                    tx(TransactionKind::Expense, "Food", 120.0),
                    tx(TransactionKind::Expense, "Transport", 50.0),
                ])
            });

        let mut budget_repo = MockBudgetRepository::new();
        budget_repo
            .expect_list()
            .with(eq(1), eq(Some(BudgetPeriod::Monthly)))
            .returning(|_, _| {
                Ok(vec![Budget {
                    id: 1,
                    user_id: 1,
                    category: "Food".to_string(),
                    period: BudgetPeriod::Monthly,
                    amount: 100.0,
                }])
            });

        let service = BudgetService::new(Arc::new(budget_repo), Arc::new(tx_repo));
        let summary = service.summary(1).await?;

        assert_eq!(summary.total_income, 1000.0);
        assert_eq!(summary.total_expenses, 170.0);
        assert_eq!(summary.balance, 830.0);
        assert_eq!(summary.budget_progress.len(), 2);
        let messages: Vec<&str> = summary.alerts.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(messages, vec!["Over budget by 20.00", "No budget set. Spent 50.00"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_budget_delete_missing() {
        let mut budget_repo = MockBudgetRepository::new();
        budget_repo.expect_delete().returning(|_, _| Ok(false));

        let service = BudgetService::new(
            Arc::new(budget_repo),
            Arc::new(MockTransactionRepository::new()),
        );
        let err = service.delete(1, 3).await.unwrap_err();
        assert_eq!(err.to_string(), "Budget not found");
    }
}
