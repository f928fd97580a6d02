//! Typed error handling for the crime API
//!
//! Two layers of errors exist:
//!
//! - [`StoreError`]: failures reported by the data store gateway
//! - [`ApiError`]: everything a handler can answer with, including wrapped store failures
//!
//! Every [`ApiError`] maps to an HTTP status and a short plain-text body.
//! Store failures are logged in full but only ever answered with `SQL Error`,
//! so driver messages never reach the client.
//!
//! # Example
//!
//! ```rust,ignore
//! use crime_api::prelude::*;
//!
//! match result {
//!     Err(ApiError::Conflict { case_number }) => println!("{} is taken", case_number),
//!     Err(ApiError::NotFound { case_number }) => println!("{} is gone", case_number),
//!     Err(e) => eprintln!("{} ({})", e, e.status_code()),
//!     Ok(_) => {}
//! }
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::time::Duration;
use thiserror::Error;

/// Plain-text body returned for every store failure.
pub const STORE_FAILURE_BODY: &str = "SQL Error";

// =============================================================================
// Store Errors
// =============================================================================

/// Errors reported by a [`Store`](crate::core::store::Store) implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or opened
    #[error("failed to connect to store: {message}")]
    Connection { message: String },

    /// A statement failed to execute
    #[error("statement failed: {message}")]
    Query { message: String },

    /// A write collided with a uniqueness constraint
    #[error("uniqueness constraint violated: {message}")]
    UniqueViolation { message: String },

    /// A row did not have the shape the caller expected
    #[error("unexpected row shape: {message}")]
    Decode { message: String },
}

impl StoreError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::Connection { .. } => "STORE_CONNECTION_ERROR",
            StoreError::Query { .. } => "STORE_QUERY_ERROR",
            StoreError::UniqueViolation { .. } => "STORE_UNIQUE_VIOLATION",
            StoreError::Decode { .. } => "STORE_DECODE_ERROR",
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::UniqueViolation {
                message: db.message().to_string(),
            },
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_) => StoreError::Decode {
                message: err.to_string(),
            },
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => StoreError::Connection {
                message: err.to_string(),
            },
            _ => StoreError::Query {
                message: err.to_string(),
            },
        }
    }
}

// =============================================================================
// API Errors
// =============================================================================

/// Every failure a handler can answer with
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing client input
    #[error("{message}")]
    Validation { message: String },

    /// An incident with this case number already exists
    #[error("error: case number {case_number} already exists")]
    Conflict { case_number: String },

    /// No incident with this case number exists
    #[error("error: case number {case_number} does not exist")]
    NotFound { case_number: String },

    /// The store failed; the wrapped detail is never sent to the client
    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    /// The request did not complete within its deadline
    #[error("request timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },
}

impl ApiError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Conflict { .. } => "INCIDENT_ALREADY_EXISTS",
            ApiError::NotFound { .. } => "INCIDENT_NOT_FOUND",
            ApiError::Store(e) => e.error_code(),
            ApiError::Timeout { .. } => "REQUEST_TIMEOUT",
        }
    }

    /// The plain-text body sent to the client
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Store(_) => STORE_FAILURE_BODY.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(format!("error: invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(format!("error: invalid query string: {}", rejection.body_text()))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort_unstable();
        ApiError::validation(format!("error: invalid fields: {}", fields.join(", ")))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Store(e) => tracing::error!(code = e.error_code(), "{}", e),
            ApiError::Timeout { .. } => tracing::warn!("{}", self),
            _ => tracing::debug!(code = self.error_code(), "{}", self),
        }
        // (StatusCode, String) responds with text/plain; charset=utf-8
        (status, self.client_message()).into_response()
    }
}
