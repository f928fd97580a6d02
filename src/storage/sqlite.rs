//! SQLite storage backend using sqlx.
//!
//! Provides [`SqliteStore`], the [`Store`] implementation backed by a
//! `sqlx::SqlitePool`.
//!
//! # Schema
//!
//! The store expects three tables: `Codes`, `Neighborhoods` and `Incidents`.
//! Reference tables are seeded out-of-band; [`ensure_schema`] only creates
//! whatever is missing so an empty file (or an in-memory database) is usable.
//!
//! # Row decoding
//!
//! SQLite is dynamically typed, so each value is converted by its runtime
//! storage class: `INTEGER` and `REAL` become numbers, `TEXT` becomes a
//! string and `NULL` stays null. `BLOB` columns are rejected.

use crate::config::DatabaseConfig;
use crate::core::error::StoreError;
use crate::core::query::{SqlValue, Statement};
use crate::core::store::{Row, Store};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Create the required tables (idempotent).
///
/// Safe to call on every startup; existing tables and rows are untouched.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    const TABLES: &[&str] = &[
        "CREATE TABLE IF NOT EXISTS Codes (
            code INTEGER PRIMARY KEY,
            incident_type TEXT NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS Neighborhoods (
            neighborhood_number INTEGER PRIMARY KEY,
            neighborhood_name TEXT NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS Incidents (
            case_number TEXT PRIMARY KEY,
            date_time DATETIME NOT NULL,
            code INTEGER NOT NULL,
            incident TEXT NOT NULL,
            police_grid INTEGER NOT NULL,
            neighborhood_number INTEGER NOT NULL,
            block TEXT NOT NULL
        )",
    ];

    for ddl in TABLES {
        sqlx::query(ddl).execute(pool).await?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// Data store gateway backed by SQLite.
///
/// # Example
///
/// ```rust,ignore
/// use crime_api::storage::SqliteStore;
///
/// let store = SqliteStore::connect(&config.database).await?;
/// let rows = store.query(&statement).await?;
/// ```
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open the database file described by `config`.
    ///
    /// The file is opened read-write; it is only created when
    /// `create_if_missing` is set.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(config.create_if_missing);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                tracing::error!(path = %config.path.display(), "Error opening database: {}", e);
                StoreError::Connection {
                    message: e.to_string(),
                }
            })?;

        if config.ensure_schema {
            ensure_schema(&pool).await?;
        }

        tracing::info!(path = %config.path.display(), "Now connected to database");
        Ok(Self::new(pool))
    }

    /// Open a private in-memory database with the schema applied.
    ///
    /// The pool is pinned to one connection that never expires, since every
    /// SQLite in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connection {
                message: e.to_string(),
            })?;

        ensure_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Attach every parameter positionally.
fn bind_params<'q>(
    sql: &'q str,
    params: &[SqlValue],
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    params
        .iter()
        .fold(sqlx::query(sql), |query, param| match param {
            SqlValue::Integer(value) => query.bind(*value),
            SqlValue::Text(value) => query.bind(value.clone()),
        })
}

/// Convert a driver row into a column → value map.
fn row_to_map(row: &SqliteRow) -> Result<Row, StoreError> {
    let mut map = Row::new();

    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;

        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => Value::from(row.try_get_unchecked::<i64, _>(index)?),
                "REAL" => Value::from(row.try_get_unchecked::<f64, _>(index)?),
                "TEXT" => Value::from(row.try_get_unchecked::<String, _>(index)?),
                other => {
                    return Err(StoreError::Decode {
                        message: format!(
                            "column '{}' has unsupported type {}",
                            column.name(),
                            other
                        ),
                    });
                }
            }
        };

        map.insert(column.name().to_string(), value);
    }

    Ok(map)
}

#[async_trait]
impl Store for SqliteStore {
    async fn query(&self, statement: &Statement) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "query");

        let rows = bind_params(&statement.sql, &statement.params)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_map).collect()
    }

    async fn execute(&self, statement: &Statement) -> Result<u64, StoreError> {
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "execute");

        let result = bind_params(&statement.sql, &statement.params)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
