pub mod account;
pub mod budget;
pub mod input;
pub mod ledger;

#[cfg(test)]
mod tests;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid username or password")]
    WrongPassword,
    #[error("Username already exists")]
    UserExists,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
