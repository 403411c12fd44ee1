pub mod callback;
pub mod connection;
pub mod health;
pub mod payment;
