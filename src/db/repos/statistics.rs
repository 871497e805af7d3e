use async_trait::async_trait;
use chrono::NaiveDate;

use super::DateFilter;
use crate::{db::error::DbResult, models::Statistics};

#[async_trait]
pub trait StatisticsRepo: Send + Sync {
    /// Insert a record for a date with no existing row.
    /// Returns a conflict error if the date is already present.
    async fn insert(&self, record: &Statistics) -> DbResult<Statistics>;

    /// Get the record for a single date
    async fn get_by_date(&self, date: NaiveDate) -> DbResult<Option<Statistics>>;

    /// Add the given figures onto the record for `record.date`, creating it
    /// when absent. Runs as a single transaction so concurrent writers to the
    /// same date accumulate instead of conflicting.
    ///
    /// Returns the stored record and whether this call created it.
    async fn upsert(&self, record: &Statistics) -> DbResult<(Statistics, bool)>;

    /// Overwrite the stored figures for an existing date
    async fn update(&self, record: &Statistics) -> DbResult<()>;

    /// List records whose date falls within the filter bounds, in insertion order
    async fn list_range(&self, filter: DateFilter) -> DbResult<Vec<Statistics>>;

    /// Delete every record. Returns the number of rows removed.
    async fn delete_all(&self) -> DbResult<u64>;

    /// Count stored records
    async fn count(&self) -> DbResult<i64>;
}
