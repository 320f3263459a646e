pub mod auth;
pub mod config;
pub mod db;
pub mod export;
pub mod repository;
