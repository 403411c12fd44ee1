//! Money amounts carried as fixed-point decimals.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount must be positive, got {0}")]
    NotPositive(Decimal),
    #[error("amount {0} is too large")]
    TooLarge(Decimal),
}

/// Coerce an amount to whole currency units for providers that reject
/// fractional subunits.
///
/// Fractions round up so the collected amount never falls short of the total.
pub fn to_whole_units(amount: Decimal) -> Result<u64, AmountError> {
    if amount <= Decimal::ZERO {
        return Err(AmountError::NotPositive(amount));
    }
    amount.ceil().to_u64().ok_or(AmountError::TooLarge(amount))
}
