pub mod mpesa_payments;
pub mod orders;
