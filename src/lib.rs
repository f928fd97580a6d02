//! # St. Paul Crime API
//!
//! HTTP endpoints over a relational store of crime incidents, crime codes
//! and neighborhoods.
//!
//! ## Features
//!
//! - **Filtered listings**: comma-separated integer filters on codes, neighborhoods and incidents
//! - **Parameterized queries**: request values are always bound, never spliced into SQL
//! - **Checked writes**: incidents are created only when new and removed only when present
//! - **Typed records**: store rows are decoded into per-resource types
//! - **Injected store**: handlers reach the database only through the [`Store`](core::Store) trait
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crime_api::prelude::*;
//!
//! let config = AppConfig::from_env()?;
//! let store = SqliteStore::connect(&config.database).await?;
//!
//! ServerBuilder::new()
//!     .with_store(store)
//!     .with_config(&config.server)
//!     .serve(&config.server.addr())
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod resources;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        ApiError, CodeRow, IdSet, Incident, IncidentFilter, NeighborhoodRow, Row, Rows,
        SelectBuilder, SortOrder, SqlValue, Statement, Store, StoreError, decode_rows,
    };

    // === Handlers ===
    pub use crate::resources::AppState;

    // === Storage ===
    pub use crate::storage::{SqliteStore, ensure_schema};

    // === Config ===
    pub use crate::config::{AppConfig, DatabaseConfig, LoggingConfig, ServerConfig};

    // === Server ===
    pub use crate::server::ServerBuilder;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
}
