use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::ValidationError;

/// Validate that a monetary amount is not negative.
pub fn validate_non_negative_cost(cost: &Decimal) -> Result<(), ValidationError> {
    if cost < &Decimal::ZERO {
        let mut err = ValidationError::new("negative_cost");
        err.message = Some(Cow::Borrowed("Cost cannot be negative"));
        return Err(err);
    }
    Ok(())
}
