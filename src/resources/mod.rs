//! Resource endpoints: codes, neighborhoods and incidents
//!
//! - `handlers`: axum handlers and the shared [`AppState`]
//! - `statements`: the parameterized statements each handler runs

pub mod handlers;
pub mod statements;

pub use handlers::AppState;
