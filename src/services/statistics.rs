use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{
    db::{DateFilter, DbPool, DbResult},
    models::{CreateStatistics, StatView, Statistics},
};

/// Field of the derived view a report can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Date,
    Views,
    Clicks,
    Cost,
    Cpc,
    Cpm,
}

impl SortKey {
    /// Resolve a requested sort field. Every view row carries the same fixed
    /// field set, so matching happens against that set once; anything else
    /// falls back to sorting by date.
    pub fn parse(name: Option<&str>) -> Self {
        match name {
            Some("date") => SortKey::Date,
            Some("views") => SortKey::Views,
            Some("clicks") => SortKey::Clicks,
            Some("cost") => SortKey::Cost,
            Some("cpc") => SortKey::Cpc,
            Some("cpm") => SortKey::Cpm,
            _ => SortKey::Date,
        }
    }
}

/// Report rows in presentation order.
///
/// Serializes as a JSON object keyed by date whose key order is exactly the
/// sort order, so consumers see the ordering without re-sorting.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsReport(Vec<StatView>);

impl Serialize for StatisticsReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for view in &self.0 {
            map.serialize_entry(&view.date, view)?;
        }
        map.end()
    }
}

/// Derive, order and key the report rows for a set of stored records.
///
/// The sort is stable in both directions: `reverse` flips the comparator
/// rather than the output, so ties keep their insertion order.
pub fn build_report(records: &[Statistics], sort_key: SortKey, reverse: bool) -> StatisticsReport {
    let mut views: Vec<StatView> = records.iter().map(StatView::from_record).collect();

    views.sort_by(|a, b| {
        let ord = match sort_key {
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::Views => a.views.cmp(&b.views),
            SortKey::Clicks => a.clicks.cmp(&b.clicks),
            SortKey::Cost => a.cost.cmp(&b.cost),
            SortKey::Cpc => a.cpc.cmp(&b.cpc),
            SortKey::Cpm => a.cpm.cmp(&b.cpm),
        };
        if reverse { ord.reverse() } else { ord }
    });

    StatisticsReport(views)
}

/// Service layer for statistics operations
#[derive(Clone)]
pub struct StatisticsService {
    db: Arc<DbPool>,
}

impl StatisticsService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Record figures for a day, accumulating onto any existing record.
    /// Returns the stored record and whether this call created it.
    pub async fn record(&self, input: CreateStatistics) -> DbResult<(Statistics, bool)> {
        let record = input.into_record();
        self.db.statistics().upsert(&record).await
    }

    /// Build the derived report for a date range, ordered by `sort_key`.
    pub async fn report(
        &self,
        filter: DateFilter,
        sort_key: SortKey,
        reverse: bool,
    ) -> DbResult<StatisticsReport> {
        let records = self.db.statistics().list_range(filter).await?;
        Ok(build_report(&records, sort_key, reverse))
    }

    /// Delete every stored record. Returns the number of rows removed.
    pub async fn reset(&self) -> DbResult<u64> {
        self.db.statistics().delete_all().await
    }
}
