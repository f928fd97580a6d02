//! Core module containing the request-to-query translation layer

pub mod error;
pub mod filter;
pub mod query;
pub mod record;
pub mod store;

pub use error::{ApiError, StoreError};
pub use filter::{IdSet, IncidentFilter, IncidentParams};
pub use query::{Comparison, SelectBuilder, SortOrder, SqlValue, Statement};
pub use record::{CodeRow, Incident, NeighborhoodRow, Rows};
pub use store::{Row, Store, decode_rows};
