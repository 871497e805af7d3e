use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

use super::common::{cents_to_cost, cost_to_cents};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{DateFilter, StatisticsRepo},
    },
    models::Statistics,
};

pub struct SqliteStatisticsRepo {
    pool: SqlitePool,
}

impl SqliteStatisticsRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_statistics(row: &sqlx::sqlite::SqliteRow) -> Statistics {
    Statistics {
        date: row.get("date"),
        views: row.get("views"),
        clicks: row.get("clicks"),
        cost: cents_to_cost(row.get("cost_cents")),
    }
}

#[async_trait]
impl StatisticsRepo for SqliteStatisticsRepo {
    async fn insert(&self, record: &Statistics) -> DbResult<Statistics> {
        let cost_cents = cost_to_cents(record.cost)?;

        sqlx::query(
            r#"
            INSERT INTO statistics (date, views, clicks, cost_cents)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(record.date)
        .bind(record.views)
        .bind(record.clicks)
        .bind(cost_cents)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::Conflict(
                format!("Statistics for date '{}' already exist", record.date),
            ),
            _ => DbError::from(e),
        })?;

        Ok(Statistics {
            date: record.date,
            views: record.views,
            clicks: record.clicks,
            cost: cents_to_cost(cost_cents),
        })
    }

    async fn get_by_date(&self, date: NaiveDate) -> DbResult<Option<Statistics>> {
        let result = sqlx::query(
            r#"
            SELECT date, views, clicks, cost_cents
            FROM statistics
            WHERE date = ?
            "#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result.map(|row| row_to_statistics(&row)))
    }

    async fn upsert(&self, record: &Statistics) -> DbResult<(Statistics, bool)> {
        let cost_cents = cost_to_cents(record.cost)?;

        // The first statement is a write, so this transaction takes the
        // database write lock up front. Two writers racing on the same date
        // serialize here and the loser lands on the accumulate branch.
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query(
            r#"
            INSERT OR IGNORE INTO statistics (date, views, clicks, cost_cents)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(record.date)
        .bind(record.views)
        .bind(record.clicks)
        .bind(cost_cents)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        let stored = if created {
            Statistics {
                date: record.date,
                views: record.views,
                clicks: record.clicks,
                cost: cents_to_cost(cost_cents),
            }
        } else {
            let row = sqlx::query(
                r#"
                UPDATE statistics
                SET views = views + ?, clicks = clicks + ?, cost_cents = cost_cents + ?
                WHERE date = ?
                RETURNING date, views, clicks, cost_cents
                "#,
            )
            .bind(record.views)
            .bind(record.clicks)
            .bind(cost_cents)
            .bind(record.date)
            .fetch_one(&mut *tx)
            .await?;
            row_to_statistics(&row)
        };

        tx.commit().await?;

        Ok((stored, created))
    }

    async fn update(&self, record: &Statistics) -> DbResult<()> {
        let cost_cents = cost_to_cents(record.cost)?;

        let result = sqlx::query(
            r#"
            UPDATE statistics
            SET views = ?, clicks = ?, cost_cents = ?
            WHERE date = ?
            "#,
        )
        .bind(record.views)
        .bind(record.clicks)
        .bind(cost_cents)
        .bind(record.date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn list_range(&self, filter: DateFilter) -> DbResult<Vec<Statistics>> {
        // Build dynamic WHERE clause for the optional bounds
        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(from) = filter.from {
            conditions.push("date >= ?");
            params.push(from.to_string());
        }
        if let Some(to) = filter.to {
            conditions.push("date <= ?");
            params.push(to.to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        // rowid order is insertion order
        let sql = format!(
            r#"
            SELECT date, views, clicks, cost_cents
            FROM statistics
            {}
            ORDER BY rowid
            "#,
            where_clause
        );

        let mut query = sqlx::query(&sql);
        for param in &params {
            query = query.bind(param);
        }

        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows.iter().map(row_to_statistics).collect())
    }

    async fn delete_all(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM statistics")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM statistics")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("count"))
    }
}
