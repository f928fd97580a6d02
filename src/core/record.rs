//! Typed records for each resource
//!
//! Rows coming back from the store are decoded into these types, so a
//! column that is missing or has the wrong type fails the request instead
//! of leaking an oddly shaped payload.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A crime code as listed by `GET /codes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRow {
    pub code: i64,
    #[serde(rename = "type")]
    pub incident_type: String,
}

/// A neighborhood as listed by `GET /neighborhoods`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborhoodRow {
    pub id: i64,
    pub name: String,
}

/// A crime incident
///
/// The same shape is accepted by `PUT /new-incident` and returned by
/// `GET /incidents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Incident {
    #[validate(length(min = 1, max = 64), custom(function = "validate_case_number"))]
    pub case_number: String,

    #[validate(custom(function = "validate_date_time"))]
    pub date_time: String,

    #[validate(range(min = 0))]
    pub code: i64,

    #[validate(length(min = 1))]
    pub incident: String,

    #[validate(range(min = 0))]
    pub police_grid: i64,

    #[validate(range(min = 0))]
    pub neighborhood_number: i64,

    #[validate(length(min = 1))]
    pub block: String,
}

impl Incident {
    /// Same incident with its case number in canonical form
    pub fn canonicalized(mut self) -> Self {
        self.case_number = canonical_case_number(&self.case_number).to_string();
        self
    }
}

/// Canonical form of a case number as stored and looked up
///
/// Surrounding whitespace is dropped, so a padded value and its trimmed
/// form name the same incident.
pub fn canonical_case_number(raw: &str) -> &str {
    raw.trim()
}

fn validate_case_number(value: &str) -> Result<(), ValidationError> {
    if !value.is_empty() && canonical_case_number(value) == value {
        Ok(())
    } else {
        Err(ValidationError::new("case_number"))
    }
}

/// Accepted `date_time` layouts; the first matches the seeded data
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn validate_date_time(value: &str) -> Result<(), ValidationError> {
    if DATE_TIME_FORMATS
        .iter()
        .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
    {
        Ok(())
    } else {
        Err(ValidationError::new("date_time"))
    }
}

/// List payload: `{ "rows": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rows<T> {
    pub rows: Vec<T>,
}

impl<T> From<Vec<T>> for Rows<T> {
    fn from(rows: Vec<T>) -> Self {
        Self { rows }
    }
}
