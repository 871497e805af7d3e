use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::db::error::{DbError, DbResult};

/// Convert a monetary amount to the integer cents stored in the database.
/// Sub-cent residue rounds to even, matching the ingestion rounding rule.
/// Amounts too large to scale are a validation error, not a panic.
pub fn cost_to_cents(cost: Decimal) -> DbResult<i64> {
    cost.checked_mul(Decimal::ONE_HUNDRED)
        .map(|cents| cents.round())
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| DbError::Validation(format!("Cost out of range: {cost}")))
}

/// Convert stored integer cents back to a two-decimal amount.
pub fn cents_to_cost(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
