pub mod callback;
pub mod connection;
pub mod payment;
