//! Request filters
//!
//! Turns raw query-string values into typed filters. Parsing is strict:
//! a token that is not an integer or a date is a client error, never
//! silently dropped or coerced.

use crate::core::error::ApiError;
use chrono::{Days, NaiveDate};
use std::collections::BTreeSet;

/// Date format accepted by the incident date filters
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Most distinct values a single list filter may carry
///
/// Each value becomes one bound parameter. `/incidents` combines three
/// lists and two dates, which stays under SQLite's historic limit of
/// 999 variables per statement.
pub const MAX_IDS: usize = 250;

/// Inclusion set of integer identifiers parsed from a CSV query value
///
/// An empty set means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSet(BTreeSet<i64>);

impl IdSet {
    /// Parse a comma-separated list of integers
    ///
    /// `param` only names the parameter in error messages. An absent or
    /// blank value yields an empty set; more than [`MAX_IDS`] distinct
    /// values is a validation error.
    ///
    /// # Example
    /// ```rust,ignore
    /// let codes = IdSet::parse("code", Some("110, 120"))?;
    /// assert_eq!(codes.iter().collect::<Vec<_>>(), vec![110, 120]);
    /// ```
    pub fn parse(param: &str, raw: Option<&str>) -> Result<Self, ApiError> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::default());
        };

        let ids = raw
            .split(',')
            .map(|token| {
                let token = token.trim();
                token.parse::<i64>().map_err(|_| {
                    ApiError::validation(format!(
                        "error: '{}' must be a comma-separated list of integers, got '{}'",
                        param, token
                    ))
                })
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        if ids.len() > MAX_IDS {
            return Err(ApiError::validation(format!(
                "error: '{}' accepts at most {} values, got {}",
                param, MAX_IDS, ids.len()
            )));
        }

        Ok(Self(ids))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    /// Values in ascending order
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<i64> for IdSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parse an optional `YYYY-MM-DD` query value
fn parse_date(param: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|_| {
            ApiError::validation(format!(
                "error: '{}' must be a date formatted YYYY-MM-DD, got '{}'",
                param, raw
            ))
        })
}

/// Raw incident filter values as they arrive in the query string
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct IncidentParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub code: Option<String>,
    pub grid: Option<String>,
    pub neighborhood: Option<String>,
}

/// Validated filter for the incident listing
///
/// Both date bounds are inclusive calendar days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub codes: IdSet,
    pub grids: IdSet,
    pub neighborhoods: IdSet,
}

impl IncidentFilter {
    pub fn from_params(params: &IncidentParams) -> Result<Self, ApiError> {
        let filter = Self {
            start_date: parse_date("start_date", params.start_date.as_deref())?,
            end_date: parse_date("end_date", params.end_date.as_deref())?,
            codes: IdSet::parse("code", params.code.as_deref())?,
            grids: IdSet::parse("grid", params.grid.as_deref())?,
            neighborhoods: IdSet::parse("neighborhood", params.neighborhood.as_deref())?,
        };

        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date)
            && start > end
        {
            return Err(ApiError::validation(format!(
                "error: start_date {} is after end_date {}",
                start, end
            )));
        }

        Ok(filter)
    }

    /// Lower bound for `date_time`, compared as text
    pub fn lower_bound(&self) -> Option<String> {
        self.start_date.map(|d| d.format(DATE_FORMAT).to_string())
    }

    /// Exclusive upper bound for `date_time`: the day after `end_date`
    pub fn upper_bound(&self) -> Option<String> {
        self.end_date
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .map(|d| d.format(DATE_FORMAT).to_string())
    }
}
