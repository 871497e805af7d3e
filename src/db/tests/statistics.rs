//! Shared tests for StatisticsRepo implementations
//!
//! Tests are written as async functions that take `&dyn StatisticsRepo`, so
//! the same logic can run against any backing store.

use chrono::NaiveDate;
use rust_decimal::{Decimal, dec};

use crate::{
    db::{
        error::DbError,
        repos::{DateFilter, StatisticsRepo},
    },
    models::Statistics,
};

// ============================================================================
// Test Input Helpers
// ============================================================================

fn day(s: &str) -> NaiveDate {
    s.parse().expect("Invalid test date")
}

fn record(date: &str, views: i64, clicks: i64, cost: Decimal) -> Statistics {
    Statistics {
        date: day(date),
        views,
        clicks,
        cost,
    }
}

/// Insert records for 2000-01-01..03 with views 100/200/300, clicks
/// 150/300/450 and cost 30/60/90.
async fn seed_three_days(repo: &dyn StatisticsRepo) {
    for i in 1..=3i64 {
        let input = record(
            &format!("2000-01-0{i}"),
            100 * i,
            150 * i,
            Decimal::from(30 * i),
        );
        repo.insert(&input).await.expect("Failed to seed record");
    }
}

// ============================================================================
// Shared Test Functions
// ============================================================================

pub async fn test_insert_round_trip(repo: &dyn StatisticsRepo) {
    let input = record("2000-01-01", 100, 150, dec!(30.00));
    let stored = repo.insert(&input).await.expect("Failed to insert record");

    assert_eq!(stored.date, day("2000-01-01"));
    assert_eq!(stored.views, 100);
    assert_eq!(stored.clicks, 150);
    assert_eq!(stored.cost, dec!(30.00));

    let fetched = repo
        .get_by_date(day("2000-01-01"))
        .await
        .expect("Failed to get record")
        .expect("Record should exist");
    assert_eq!(fetched, stored);
}

pub async fn test_insert_duplicate_date_conflicts(repo: &dyn StatisticsRepo) {
    let input = record("2000-01-01", 100, 150, dec!(30.00));
    repo.insert(&input)
        .await
        .expect("Failed to insert first record");

    let result = repo.insert(&input).await;

    assert!(matches!(result, Err(DbError::Conflict(_))));
}

pub async fn test_get_by_date_not_found(repo: &dyn StatisticsRepo) {
    let result = repo
        .get_by_date(day("2000-01-01"))
        .await
        .expect("Query should succeed");

    assert!(result.is_none());
}

pub async fn test_upsert_creates_missing_date(repo: &dyn StatisticsRepo) {
    let input = record("2000-01-01", 100, 150, dec!(30.00));
    let (stored, created) = repo.upsert(&input).await.expect("Failed to upsert");

    assert!(created);
    assert_eq!(stored.views, 100);
    assert_eq!(stored.clicks, 150);
    assert_eq!(stored.cost, dec!(30.00));
}

pub async fn test_upsert_accumulates_existing_date(repo: &dyn StatisticsRepo) {
    let first = record("2000-01-01", 100, 150, dec!(30.00));
    repo.upsert(&first).await.expect("Failed to upsert");

    let second = record("2000-01-01", 50, 25, dec!(10.00));
    let (stored, created) = repo.upsert(&second).await.expect("Failed to upsert");

    assert!(!created);
    assert_eq!(stored.views, 150);
    assert_eq!(stored.clicks, 175);
    assert_eq!(stored.cost, dec!(40.00));

    let fetched = repo
        .get_by_date(day("2000-01-01"))
        .await
        .expect("Failed to get record")
        .expect("Record should exist");
    assert_eq!(fetched, stored);
}

pub async fn test_upsert_rounds_each_contribution(repo: &dyn StatisticsRepo) {
    // 0.004 rounds to 0.00 per contribution, so three of them stay at zero
    // even though the raw sum 0.012 would round to 0.01.
    for _ in 0..3 {
        let input = record("2000-01-01", 0, 0, dec!(0.004));
        repo.upsert(&input).await.expect("Failed to upsert");
    }

    let stored = repo
        .get_by_date(day("2000-01-01"))
        .await
        .expect("Failed to get record")
        .expect("Record should exist");
    assert_eq!(stored.cost, dec!(0.00));
}

pub async fn test_upsert_out_of_range_cost_errors(repo: &dyn StatisticsRepo) {
    let input = record(
        "2000-01-01",
        0,
        0,
        dec!(1_000_000_000_000_000_000_000_000_000),
    );
    let result = repo.upsert(&input).await;

    assert!(matches!(result, Err(DbError::Validation(_))));

    let stored = repo
        .get_by_date(day("2000-01-01"))
        .await
        .expect("Query should succeed");
    assert!(stored.is_none());
}

pub async fn test_update_overwrites_fields(repo: &dyn StatisticsRepo) {
    let input = record("2000-01-01", 100, 150, dec!(30.00));
    repo.insert(&input).await.expect("Failed to insert record");

    let replacement = record("2000-01-01", 500, 600, dec!(70.50));
    repo.update(&replacement)
        .await
        .expect("Failed to update record");

    let fetched = repo
        .get_by_date(day("2000-01-01"))
        .await
        .expect("Failed to get record")
        .expect("Record should exist");
    assert_eq!(fetched.views, 500);
    assert_eq!(fetched.clicks, 600);
    assert_eq!(fetched.cost, dec!(70.50));
}

pub async fn test_update_missing_date_fails(repo: &dyn StatisticsRepo) {
    let input = record("2000-01-01", 100, 150, dec!(30.00));
    let result = repo.update(&input).await;

    assert!(matches!(result, Err(DbError::NotFound)));
}

pub async fn test_list_range_bounds_matrix(repo: &dyn StatisticsRepo) {
    seed_three_days(repo).await;

    let cases: &[(Option<&str>, Option<&str>, &[&str])] = &[
        (None, None, &["2000-01-01", "2000-01-02", "2000-01-03"]),
        (
            Some("2000-01-01"),
            Some("2000-01-03"),
            &["2000-01-01", "2000-01-02", "2000-01-03"],
        ),
        (
            Some("1999-01-01"),
            Some("2001-01-01"),
            &["2000-01-01", "2000-01-02", "2000-01-03"],
        ),
        (Some("2000-01-01"), Some("2000-01-01"), &["2000-01-01"]),
        (Some("2000-01-02"), Some("2000-01-02"), &["2000-01-02"]),
        (Some("2000-01-03"), Some("2000-01-03"), &["2000-01-03"]),
        (
            Some("2000-01-01"),
            Some("2000-01-02"),
            &["2000-01-01", "2000-01-02"],
        ),
        (
            Some("2000-01-02"),
            Some("2000-01-03"),
            &["2000-01-02", "2000-01-03"],
        ),
        (Some("2000-01-02"), None, &["2000-01-02", "2000-01-03"]),
        (None, Some("2000-01-02"), &["2000-01-01", "2000-01-02"]),
        (Some("2000-02-01"), None, &[]),
        (None, Some("1999-12-31"), &[]),
        (Some("2000-01-03"), Some("2000-01-01"), &[]),
    ];

    for (from, to, expected) in cases {
        let filter = DateFilter {
            from: from.map(day),
            to: to.map(day),
        };
        let rows = repo
            .list_range(filter)
            .await
            .expect("Failed to list records");
        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        let expected: Vec<NaiveDate> = expected.iter().map(|d| day(d)).collect();
        assert_eq!(dates, expected, "from={from:?} to={to:?}");
    }
}

pub async fn test_list_range_preserves_insertion_order(repo: &dyn StatisticsRepo) {
    for date in ["2000-01-03", "2000-01-01", "2000-01-02"] {
        let input = record(date, 1, 1, dec!(1.00));
        repo.insert(&input).await.expect("Failed to insert record");
    }

    let rows = repo
        .list_range(DateFilter::default())
        .await
        .expect("Failed to list records");
    let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();

    assert_eq!(
        dates,
        vec![day("2000-01-03"), day("2000-01-01"), day("2000-01-02")]
    );
}

pub async fn test_delete_all_empties_store(repo: &dyn StatisticsRepo) {
    seed_three_days(repo).await;

    let removed = repo.delete_all().await.expect("Failed to delete records");
    assert_eq!(removed, 3);

    let rows = repo
        .list_range(DateFilter::default())
        .await
        .expect("Failed to list records");
    assert!(rows.is_empty());
    assert_eq!(repo.count().await.expect("Failed to count"), 0);
}

pub async fn test_delete_all_is_idempotent(repo: &dyn StatisticsRepo) {
    seed_three_days(repo).await;

    repo.delete_all().await.expect("First delete should succeed");
    let removed = repo
        .delete_all()
        .await
        .expect("Second delete should succeed");

    assert_eq!(removed, 0);
    assert_eq!(repo.count().await.expect("Failed to count"), 0);
}

pub async fn test_count_tracks_inserts(repo: &dyn StatisticsRepo) {
    assert_eq!(repo.count().await.expect("Failed to count"), 0);

    seed_three_days(repo).await;

    assert_eq!(repo.count().await.expect("Failed to count"), 3);
}

// ============================================================================
// SQLite Tests - Fast, in-memory
// ============================================================================

#[cfg(test)]
mod sqlite_tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::{
        sqlite::SqliteStatisticsRepo,
        tests::harness::{create_sqlite_pool, run_sqlite_migrations},
    };

    async fn create_repo() -> SqliteStatisticsRepo {
        let pool = create_sqlite_pool().await;
        run_sqlite_migrations(&pool).await;
        SqliteStatisticsRepo::new(pool)
    }

    #[tokio::test]
    async fn sqlite_insert_round_trip() {
        let repo = create_repo().await;
        test_insert_round_trip(&repo).await;
    }

    #[tokio::test]
    async fn sqlite_insert_duplicate_date_conflicts() {
        let repo = create_repo().await;
        test_insert_duplicate_date_conflicts(&repo).await;
    }

    #[tokio::test]
    async fn sqlite_get_by_date_not_found() {
        let repo = create_repo().await;
        test_get_by_date_not_found(&repo).await;
    }

    #[tokio::test]
    async fn sqlite_upsert_creates_missing_date() {
        let repo = create_repo().await;
        test_upsert_creates_missing_date(&repo).await;
    }

    #[tokio::test]
    async fn sqlite_upsert_accumulates_existing_date() {
        let repo = create_repo().await;
        test_upsert_accumulates_existing_date(&repo).await;
    }

    #[tokio::test]
    async fn sqlite_upsert_rounds_each_contribution() {
        let repo = create_repo().await;
        test_upsert_rounds_each_contribution(&repo).await;
    }

    #[tokio::test]
    async fn sqlite_upsert_out_of_range_cost_errors() {
        let repo = create_repo().await;
        test_upsert_out_of_range_cost_errors(&repo).await;
    }

    #[tokio::test]
    async fn sqlite_update_overwrites_fields() {
        let repo = create_repo().await;
        test_update_overwrites_fields(&repo).await;
    }

    #[tokio::test]
    async fn sqlite_update_missing_date_fails() {
        let repo = create_repo().await;
        test_update_missing_date_fails(&repo).await;
    }

    #[tokio::test]
    async fn sqlite_list_range_bounds_matrix() {
        let repo = create_repo().await;
        test_list_range_bounds_matrix(&repo).await;
    }

    #[tokio::test]
    async fn sqlite_list_range_preserves_insertion_order() {
        let repo = create_repo().await;
        test_list_range_preserves_insertion_order(&repo).await;
    }

    #[tokio::test]
    async fn sqlite_delete_all_empties_store() {
        let repo = create_repo().await;
        test_delete_all_empties_store(&repo).await;
    }

    #[tokio::test]
    async fn sqlite_delete_all_is_idempotent() {
        let repo = create_repo().await;
        test_delete_all_is_idempotent(&repo).await;
    }

    #[tokio::test]
    async fn sqlite_count_tracks_inserts() {
        let repo = create_repo().await;
        test_count_tracks_inserts(&repo).await;
    }

    /// Parallel writers to a single date must serialize inside the upsert
    /// transaction: exactly one of them creates the row and every
    /// contribution lands in the totals.
    #[tokio::test]
    async fn sqlite_concurrent_upserts_accumulate() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("stats.db");
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(
                sqlx::sqlite::SqliteConnectOptions::new()
                    .filename(&path)
                    .create_if_missing(true)
                    .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                    .busy_timeout(std::time::Duration::from_millis(5000)),
            )
            .await
            .expect("Failed to create file-backed SQLite pool");
        run_sqlite_migrations(&pool).await;

        let repo = Arc::new(SqliteStatisticsRepo::new(pool));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                let contribution = record("2024-06-01", 1, 2, dec!(0.25));
                repo.upsert(&contribution).await
            }));
        }

        let mut created_count = 0;
        for handle in handles {
            let (_, created) = handle
                .await
                .expect("Upsert task panicked")
                .expect("Upsert failed");
            if created {
                created_count += 1;
            }
        }

        assert_eq!(created_count, 1);

        let stored = repo
            .get_by_date(day("2024-06-01"))
            .await
            .expect("Failed to get record")
            .expect("Record should exist");
        assert_eq!(stored.views, 16);
        assert_eq!(stored.clicks, 32);
        assert_eq!(stored.cost, dec!(4.00));
    }
}
