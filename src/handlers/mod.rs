pub mod customer;
pub mod health;
