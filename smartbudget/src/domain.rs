pub mod filter;
pub mod models;
pub mod repository;
pub mod summary;
