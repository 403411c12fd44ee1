pub mod callback;
pub mod repository;
pub mod types;
