use crate::api::budgets::{delete_budget, list_budgets, set_budget, summary};
use crate::api::error::{json_error_handler, query_error_handler};
use crate::api::routes::{health, login, me, register};
use crate::api::transactions::{ledger_scope, recent};
use crate::domain::models::TransactionKind;
use crate::domain::repository::{BudgetRepository, TransactionRepository, UserRepository};
use crate::infra::auth::AuthManager;
use crate::infra::repository::{PgBudgetRepository, PgTransactionRepository, PgUserRepository};
use crate::service::account::AccountService;
use crate::service::budget::BudgetService;
use crate::service::ledger::LedgerService;
use actix_web::web;
use actix_web::web::ServiceConfig;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

/// Storage handles the services are built from.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub budgets: Arc<dyn BudgetRepository>,
}

impl Repositories {
    pub fn postgres(pool: Pool<Postgres>) -> Repositories {
        Repositories {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            transactions: Arc::new(PgTransactionRepository::new(pool.clone())),
            budgets: Arc::new(PgBudgetRepository::new(pool)),
        }
    }
}

pub fn create_app(
    repos: Repositories,
    auth_manager: web::Data<AuthManager>,
) -> Box<dyn Fn(&mut ServiceConfig)> {
    Box::new(move |cfg: &mut ServiceConfig| {
        let account_service = web::Data::new(AccountService::new(Arc::clone(&repos.users)));
        let ledger_service =
            web::Data::new(LedgerService::new(Arc::clone(&repos.transactions)));
        let budget_service = web::Data::new(BudgetService::new(
            Arc::clone(&repos.budgets),
            Arc::clone(&repos.transactions),
        ));

        cfg.app_data(auth_manager.clone())
            .app_data(account_service)
            .app_data(ledger_service)
            .app_data(budget_service)
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .service(
                web::scope("/api")
                    .service(health)
                    .service(register)
                    .service(login)
                    .service(me)
                    .service(ledger_scope(TransactionKind::Income))
                    .service(ledger_scope(TransactionKind::Expense))
                    .service(recent)
                    .service(list_budgets)
                    .service(set_budget)
                    .service(delete_budget)
                    .service(summary),
            );
    })
}
