pub mod connection;
pub mod user_repository;
