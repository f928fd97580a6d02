//! Route tables

use crate::resources::handlers::{
    AppState, create_incident, list_codes, list_incidents, list_neighborhoods, remove_incident,
};
use axum::{
    Json, Router,
    routing::{delete, get, put},
};
use serde_json::{Value, json};

/// Build the resource routes
///
/// - GET /codes - List crime codes (`code` CSV filter)
/// - GET /neighborhoods - List neighborhoods (`id` CSV filter)
/// - GET /incidents - List incidents (date, code, grid, neighborhood filters)
/// - PUT /new-incident - Create an incident
/// - DELETE /remove-incident - Delete an incident by `case_number`
pub fn build_resource_routes(state: AppState) -> Router {
    Router::new()
        .route("/codes", get(list_codes))
        .route("/neighborhoods", get(list_neighborhoods))
        .route("/incidents", get(list_incidents))
        .route("/new-incident", put(create_incident))
        .route("/remove-incident", delete(remove_incident))
        .with_state(state)
}

/// Build health check routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME")
    }))
}
