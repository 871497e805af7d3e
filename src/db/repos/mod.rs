mod statistics;

use chrono::NaiveDate;
pub use statistics::*;

/// Inclusive date bounds for range queries.
///
/// Both bounds are optional and independent: an absent bound leaves that side
/// of the range open. An inverted range (`from > to`) matches nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFilter {
    /// Lower bound, `date >= from` when present.
    pub from: Option<NaiveDate>,
    /// Upper bound, `date <= to` when present.
    pub to: Option<NaiveDate>,
}
