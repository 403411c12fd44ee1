pub mod db;
pub mod mpesa;
