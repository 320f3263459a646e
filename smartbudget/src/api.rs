pub mod app;
pub mod budgets;
pub mod error;
pub mod routes;
pub mod transactions;
