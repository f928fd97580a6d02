//! Parameterized statement building
//!
//! Statements are assembled from trusted text (base `SELECT`, column names)
//! plus bound values. Values never appear in the SQL text; each one gets a
//! `?` placeholder and travels in [`Statement::params`].
//!
//! # Example
//! ```rust,ignore
//! let statement = SelectBuilder::new("SELECT code, incident_type AS type FROM Codes")
//!     .filter_in("code", &codes)
//!     .order_by("code", SortOrder::Desc)
//!     .build();
//!
//! // SELECT code, incident_type AS type FROM Codes WHERE code IN (?, ?) ORDER BY code DESC
//! ```

use crate::core::filter::IdSet;
use std::fmt;

/// A value bound to a statement placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Integer(i64),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

/// SQL text plus the values for its placeholders, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    /// Create a statement from text and positional parameters
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Sort direction for an `ORDER BY` key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}

/// Comparison operators usable in a single-value predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Comparison {
    fn as_sql(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
        }
    }
}

/// Builder for filtered, ordered `SELECT` statements
///
/// Column names are `&'static str` so that only compile-time text can
/// reach the statement; everything supplied by a request is bound.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    base: String,
    predicates: Vec<String>,
    params: Vec<SqlValue>,
    order_by: Vec<(&'static str, SortOrder)>,
}

impl SelectBuilder {
    /// Start from a base `SELECT ... FROM ...` without `WHERE` or `ORDER BY`
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            predicates: Vec::new(),
            params: Vec::new(),
            order_by: Vec::new(),
        }
    }

    /// Restrict `column` to the values in `ids`
    ///
    /// An empty set adds nothing.
    pub fn filter_in(mut self, column: &'static str, ids: &IdSet) -> Self {
        if ids.is_empty() {
            return self;
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let predicate = format!("{} IN ({})", column, placeholders);
        self.predicates.push(predicate);
        self.params.extend(ids.iter().map(SqlValue::Integer));
        self
    }

    /// Compare `column` against a single bound value
    pub fn filter_cmp(
        mut self,
        column: &'static str,
        op: Comparison,
        value: impl Into<SqlValue>,
    ) -> Self {
        let predicate = format!("{} {} ?", column, op.as_sql());
        self.predicates.push(predicate);
        self.params.push(value.into());
        self
    }

    /// Shorthand for an equality predicate
    pub fn filter_eq(self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.filter_cmp(column, Comparison::Eq, value)
    }

    /// Append a sort key; keys apply in the order they were added
    pub fn order_by(mut self, column: &'static str, order: SortOrder) -> Self {
        self.order_by.push((column, order));
        self
    }

    pub fn build(self) -> Statement {
        let mut sql = self.base;

        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.predicates.join(" AND "));
        }

        if !self.order_by.is_empty() {
            let keys: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, order)| format!("{} {}", column, order))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }

        Statement {
            sql,
            params: self.params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "SELECT code, incident_type AS type FROM Codes";

    fn ids(raw: &str) -> IdSet {
        IdSet::parse("code", Some(raw)).expect("valid id set")
    }

    #[test]
    fn test_empty_set_only_orders() {
        let statement = SelectBuilder::new(BASE)
            .filter_in("code", &IdSet::default())
            .order_by("code", SortOrder::Desc)
            .build();

        assert_eq!(statement.sql, format!("{} ORDER BY code DESC", BASE));
        assert!(statement.params.is_empty());
    }

    #[test]
    fn test_in_predicate_has_one_placeholder_per_value() {
        let statement = SelectBuilder::new(BASE)
            .filter_in("code", &ids("110,120,130"))
            .order_by("code", SortOrder::Desc)
            .build();

        assert_eq!(
            statement.sql,
            format!("{} WHERE code IN (?, ?, ?) ORDER BY code DESC", BASE)
        );
        assert_eq!(
            statement.params,
            vec![
                SqlValue::Integer(110),
                SqlValue::Integer(120),
                SqlValue::Integer(130)
            ]
        );
    }

    #[test]
    fn test_predicates_join_with_and() {
        let statement = SelectBuilder::new("SELECT * FROM Incidents")
            .filter_cmp("date_time", Comparison::Gte, "2019-10-01")
            .filter_in("code", &ids("600"))
            .filter_eq("block", "1XX MAIN ST")
            .build();

        assert_eq!(
            statement.sql,
            "SELECT * FROM Incidents WHERE date_time >= ? AND code IN (?) AND block = ?"
        );
        assert_eq!(statement.params.len(), 3);
        assert_eq!(statement.params[2], SqlValue::Text("1XX MAIN ST".to_string()));
    }

    #[test]
    fn test_values_never_reach_sql_text() {
        let statement = SelectBuilder::new("SELECT * FROM Incidents")
            .filter_eq("case_number", "x'; DROP TABLE Incidents; --")
            .build();

        assert!(!statement.sql.contains("DROP"));
        assert_eq!(statement.sql, "SELECT * FROM Incidents WHERE case_number = ?");
    }

    #[test]
    fn test_multiple_sort_keys() {
        let statement = SelectBuilder::new("SELECT * FROM Incidents")
            .order_by("date_time", SortOrder::Desc)
            .order_by("case_number", SortOrder::Asc)
            .build();

        assert_eq!(
            statement.sql,
            "SELECT * FROM Incidents ORDER BY date_time DESC, case_number ASC"
        );
    }
}
