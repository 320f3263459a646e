pub mod budget;
pub mod transaction;
pub mod user;

pub use budget::PgBudgetRepository;
pub use transaction::PgTransactionRepository;
pub use user::PgUserRepository;
