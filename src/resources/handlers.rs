//! HTTP handlers for codes, neighborhoods and incidents
//!
//! Each handler parses its input, runs statements through the [`Store`]
//! and answers with JSON on success or a plain-text [`ApiError`] otherwise.
//! Every handler runs under the request deadline held in [`AppState`].

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

use crate::core::error::{ApiError, StoreError};
use crate::core::filter::{IdSet, IncidentFilter, IncidentParams};
use crate::core::record::{CodeRow, Incident, NeighborhoodRow, Rows, canonical_case_number};
use crate::core::store::{Store, decode_rows};
use crate::resources::statements;

/// Plain-text body for successful writes
pub const SUCCESS_BODY: &str = "success";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, request_timeout: Duration) -> Self {
        Self {
            store,
            request_timeout,
        }
    }

    /// Run `work` under the request deadline
    ///
    /// When the deadline passes the pending store operation is dropped and
    /// the request fails with [`ApiError::Timeout`].
    pub async fn within_deadline<T>(
        &self,
        work: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, ApiError> {
        match tokio::time::timeout(self.request_timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout {
                after: self.request_timeout,
            }),
        }
    }
}

/// Query string for `GET /codes`
#[derive(Debug, Default, Deserialize)]
pub struct CodeParams {
    pub code: Option<String>,
}

/// Query string for `GET /neighborhoods`
#[derive(Debug, Default, Deserialize)]
pub struct NeighborhoodParams {
    pub id: Option<String>,
}

/// Query string for `DELETE /remove-incident`
#[derive(Debug, Default, Deserialize)]
pub struct RemoveIncidentParams {
    pub case_number: Option<String>,
}

// =============================================================================
// Reads
// =============================================================================

/// List crime codes
///
/// GET /codes?code=110,120
pub async fn list_codes(
    State(state): State<AppState>,
    params: Result<Query<CodeParams>, QueryRejection>,
) -> Result<Json<Rows<CodeRow>>, ApiError> {
    let Query(params) = params?;
    let codes = IdSet::parse("code", params.code.as_deref())?;
    tracing::debug!(?codes, "list codes");

    state
        .within_deadline(fetch_codes(state.store.as_ref(), &codes))
        .await
        .map(|rows| Json(rows.into()))
}

async fn fetch_codes(store: &dyn Store, codes: &IdSet) -> Result<Vec<CodeRow>, ApiError> {
    let rows = store.query(&statements::list_codes(codes)).await?;
    Ok(decode_rows(rows)?)
}

/// List neighborhoods
///
/// GET /neighborhoods?id=1,2
pub async fn list_neighborhoods(
    State(state): State<AppState>,
    params: Result<Query<NeighborhoodParams>, QueryRejection>,
) -> Result<Json<Rows<NeighborhoodRow>>, ApiError> {
    let Query(params) = params?;
    let ids = IdSet::parse("id", params.id.as_deref())?;
    tracing::debug!(?ids, "list neighborhoods");

    state
        .within_deadline(fetch_neighborhoods(state.store.as_ref(), &ids))
        .await
        .map(|rows| Json(rows.into()))
}

async fn fetch_neighborhoods(
    store: &dyn Store,
    ids: &IdSet,
) -> Result<Vec<NeighborhoodRow>, ApiError> {
    let rows = store.query(&statements::list_neighborhoods(ids)).await?;
    Ok(decode_rows(rows)?)
}

/// List incidents
///
/// GET /incidents?start_date=2019-10-01&end_date=2019-10-31&code=600&grid=87&neighborhood=7
pub async fn list_incidents(
    State(state): State<AppState>,
    params: Result<Query<IncidentParams>, QueryRejection>,
) -> Result<Json<Rows<Incident>>, ApiError> {
    let Query(params) = params?;
    let filter = IncidentFilter::from_params(&params)?;
    tracing::debug!(?filter, "list incidents");

    state
        .within_deadline(fetch_incidents(state.store.as_ref(), &filter))
        .await
        .map(|rows| Json(rows.into()))
}

async fn fetch_incidents(
    store: &dyn Store,
    filter: &IncidentFilter,
) -> Result<Vec<Incident>, ApiError> {
    let rows = store.query(&statements::list_incidents(filter)).await?;
    Ok(decode_rows(rows)?)
}

// =============================================================================
// Writes
// =============================================================================

/// Create an incident
///
/// PUT /new-incident
///
/// The case number is stored without surrounding whitespace. Fails with
/// 409 when it is already taken; nothing is written in that case.
pub async fn create_incident(
    State(state): State<AppState>,
    body: Result<Json<Incident>, JsonRejection>,
) -> Result<&'static str, ApiError> {
    let Json(incident) = body?;
    let incident = incident.canonicalized();
    incident.validate()?;

    state
        .within_deadline(insert_new_incident(state.store.as_ref(), &incident))
        .await?;

    tracing::info!(case_number = %incident.case_number, "Created incident");
    Ok(SUCCESS_BODY)
}

async fn insert_new_incident(store: &dyn Store, incident: &Incident) -> Result<(), ApiError> {
    let lookup = statements::find_incident(&incident.case_number);
    let existing = store.query(&lookup).await?;

    if !existing.is_empty() {
        tracing::warn!(case_number = %incident.case_number, "Rejected duplicate incident");
        return Err(ApiError::Conflict {
            case_number: incident.case_number.clone(),
        });
    }

    // A concurrent insert can land between the lookup and this write;
    // the primary key rejects it and we answer with the same conflict.
    match store.execute(&statements::insert_incident(incident)).await {
        Ok(_) => Ok(()),
        Err(StoreError::UniqueViolation { .. }) => Err(ApiError::Conflict {
            case_number: incident.case_number.clone(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Delete an incident
///
/// DELETE /remove-incident?case_number=19245020
///
/// Fails with 404 when no incident has that case number.
pub async fn remove_incident(
    State(state): State<AppState>,
    params: Result<Query<RemoveIncidentParams>, QueryRejection>,
) -> Result<&'static str, ApiError> {
    let Query(params) = params?;
    let case_number = params
        .case_number
        .map(|c| canonical_case_number(&c).to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::validation("error: 'case_number' is required"))?;

    state
        .within_deadline(delete_existing_incident(state.store.as_ref(), &case_number))
        .await?;

    tracing::info!(case_number = %case_number, "Removed incident");
    Ok(SUCCESS_BODY)
}

async fn delete_existing_incident(store: &dyn Store, case_number: &str) -> Result<(), ApiError> {
    let not_found = || ApiError::NotFound {
        case_number: case_number.to_string(),
    };

    let existing = store.query(&statements::find_incident(case_number)).await?;
    if existing.is_empty() {
        tracing::warn!(case_number = %case_number, "Incident to remove does not exist");
        return Err(not_found());
    }

    // Zero rows means someone else removed it after the lookup
    let delete = statements::delete_incident(case_number);
    let affected = store.execute(&delete).await?;
    if affected == 0 {
        return Err(not_found());
    }

    Ok(())
}
