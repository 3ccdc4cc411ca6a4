//! Relational bug repository backed by sqlx.
//!
//! Pages are read with `ORDER BY title LIMIT ? OFFSET ?`; the total comes
//! from a separate `COUNT(*)` query.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use crate::constants::{ERR_MALFORMED_DOCUMENT, SQL_INDEX_TITLE, SQL_TABLE_BUGS};
use crate::errors::ApiError;
use crate::models::Bug;
use crate::pagination::PageRequest;
use crate::repositories::BugRepository;

/// Row shape of the `bugs` table.
#[derive(Debug, FromRow)]
struct BugRow {
    id: String,
    title: String,
    description: String,
    report_time: DateTime<Utc>,
}

impl TryFrom<BugRow> for Bug {
    type Error = ApiError;

    fn try_from(row: BugRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id).map_err(|_| {
            ApiError::BackendOperationFailed(format!("{}: id {}", ERR_MALFORMED_DOCUMENT, row.id))
        })?;
        Ok(Bug {
            id,
            title: row.title,
            description: row.description,
            report_time: row.report_time,
        })
    }
}

/// Paged select for the given direction. Binds: limit, offset.
pub fn page_query(request: &PageRequest) -> String {
    format!(
        "SELECT id, title, description, report_time FROM {} ORDER BY title {} LIMIT ? OFFSET ?",
        SQL_TABLE_BUGS,
        request.sort.as_sql()
    )
}

/// Repository for the relational backend.
pub struct SqlBugRepository {
    pool: SqlitePool,
}

impl SqlBugRepository {
    /// Open a pool for `url`, creating the database file if it is missing.
    pub async fn connect(url: &str) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BugRepository for SqlBugRepository {
    async fn ensure_schema(&self) -> Result<(), ApiError> {
        info!("Ensuring table '{}' exists...", SQL_TABLE_BUGS);

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                report_time TEXT NOT NULL
            )",
            SQL_TABLE_BUGS
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} (title)",
            SQL_INDEX_TITLE, SQL_TABLE_BUGS
        ))
        .execute(&self.pool)
        .await?;

        info!("Table '{}' is ready", SQL_TABLE_BUGS);
        Ok(())
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Bug>, ApiError> {
        let query = page_query(request);
        debug!("SQL: {} [limit={}, offset={}]", query, request.limit(), request.skip());

        let offset = i64::try_from(request.skip()).unwrap_or(i64::MAX);
        let rows: Vec<BugRow> = sqlx::query_as(&query)
            .bind(request.limit())
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Bug::try_from).collect()
    }

    async fn count_all(&self) -> Result<u64, ApiError> {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", SQL_TABLE_BUGS))
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bug>, ApiError> {
        debug!("SQL: finding bug by ID: {}", id);
        let row: Option<BugRow> = sqlx::query_as(&format!(
            "SELECT id, title, description, report_time FROM {} WHERE id = ?",
            SQL_TABLE_BUGS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Bug::try_from).transpose()
    }

    async fn insert(&self, bug: &Bug) -> Result<(), ApiError> {
        sqlx::query(&format!(
            "INSERT INTO {} (id, title, description, report_time) VALUES (?, ?, ?, ?)",
            SQL_TABLE_BUGS
        ))
        .bind(bug.id.to_string())
        .bind(&bug.title)
        .bind(&bug.description)
        .bind(bug.report_time)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn replace(&self, bug: &Bug) -> Result<bool, ApiError> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET title = ?, description = ?, report_time = ? WHERE id = ?",
            SQL_TABLE_BUGS
        ))
        .bind(&bug.title)
        .bind(&bug.description)
        .bind(bug.report_time)
        .bind(bug.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", SQL_TABLE_BUGS))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
