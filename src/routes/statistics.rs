use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use axum_valid::Valid;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::{
    AppState,
    db::DateFilter,
    models::{CreateStatistics, Statistics},
    services::{SortKey, StatisticsReport},
};

/// Filtering and ordering options for the statistics report.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Inclusive lower date bound
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound
    pub date_to: Option<NaiveDate>,
    /// Report field to order by; unknown names fall back to date
    pub sort_by: Option<String>,
    /// Flip the sort direction
    #[serde(default)]
    pub reverse_sort: bool,
}

/// Outcome of recording one day of figures
#[derive(Debug, Serialize)]
pub struct SaveStatisticsResponse {
    /// The stored record after this write
    pub statistics: Statistics,
    /// Whether this write created the record
    pub created: bool,
    /// Whether this write merged into an existing record
    pub aggregated: bool,
}

/// Acknowledgement of a bulk reset
#[derive(Debug, Serialize)]
pub struct ResetStatisticsResponse {
    /// Confirmation message
    pub message: String,
    /// Error indicator, always 0 on success
    pub error: u8,
}

/// Report derived statistics over an optional date range
#[tracing::instrument(name = "api.statistics.report", skip(state))]
pub async fn report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<StatisticsReport>, ApiError> {
    let filter = DateFilter {
        from: query.date_from,
        to: query.date_to,
    };
    let sort_key = SortKey::parse(query.sort_by.as_deref());

    let report = state
        .services
        .statistics
        .report(filter, sort_key, query.reverse_sort)
        .await?;

    Ok(Json(report))
}

/// Record one day of figures, accumulating onto any existing record
#[tracing::instrument(name = "api.statistics.record", skip(state, input))]
pub async fn record(
    State(state): State<AppState>,
    Valid(Json(input)): Valid<Json<CreateStatistics>>,
) -> Result<(StatusCode, Json<SaveStatisticsResponse>), ApiError> {
    let (statistics, created) = state.services.statistics.record(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(SaveStatisticsResponse {
            statistics,
            created,
            aggregated: !created,
        }),
    ))
}

/// Delete every stored record
#[tracing::instrument(name = "api.statistics.reset", skip(state))]
pub async fn reset(
    State(state): State<AppState>,
) -> Result<Json<ResetStatisticsResponse>, ApiError> {
    let removed = state.services.statistics.reset().await?;
    tracing::info!(removed, "Statistics reset");

    Ok(Json(ResetStatisticsResponse {
        message: "Deleted".to_string(),
        error: 0,
    }))
}
