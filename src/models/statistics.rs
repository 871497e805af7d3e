use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validators::validate_non_negative_cost;

/// One day of stored advertising figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Calendar date the figures belong to
    pub date: NaiveDate,
    /// Ad impressions recorded for the date
    pub views: i64,
    /// Clicks recorded for the date
    pub clicks: i64,
    /// Money spent for the date, two decimal places
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
}

/// Incoming figures for one day. Omitted metrics default to zero.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStatistics {
    pub date: NaiveDate,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub views: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub clicks: i64,
    #[serde(default)]
    #[validate(custom(function = "validate_non_negative_cost"))]
    pub cost: Decimal,
}

impl CreateStatistics {
    /// Normalize into a storable record. The cost contribution is rounded to
    /// two decimal places (midpoint-to-even) here, before any accumulation.
    pub fn into_record(self) -> Statistics {
        Statistics {
            date: self.date,
            views: self.views,
            clicks: self.clicks,
            cost: self.cost.round_dp(2),
        }
    }
}

/// Per-day presentation row with the derived efficiency ratios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatView {
    pub date: NaiveDate,
    pub views: i64,
    pub clicks: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    /// Cost per click, null when no clicks were recorded
    #[serde(with = "rust_decimal::serde::float_option")]
    pub cpc: Option<Decimal>,
    /// Cost per thousand views, null when no views were recorded
    #[serde(with = "rust_decimal::serde::float_option")]
    pub cpm: Option<Decimal>,
}

impl StatView {
    /// Derive the presentation row for a stored record.
    pub fn from_record(record: &Statistics) -> Self {
        let cpc = (record.clicks != 0)
            .then(|| (record.cost / Decimal::from(record.clicks)).round_dp(2));
        let cpm = (record.views != 0).then(|| {
            (record.cost / Decimal::from(record.views) * Decimal::ONE_THOUSAND).round_dp(2)
        });

        StatView {
            date: record.date,
            views: record.views,
            clicks: record.clicks,
            cost: record.cost,
            cpc,
            cpm,
        }
    }
}
