//! Data store gateway
//!
//! The handlers only ever talk to a [`Store`]. The trait exposes the two
//! operations a relational store needs to offer here: run a read and get
//! rows back, or run a write and learn how many rows it touched.

use crate::core::error::StoreError;
use crate::core::query::Statement;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// One result row: column name (or alias) to value
pub type Row = Map<String, Value>;

/// Gateway to the persistent store
///
/// Both operations bind [`Statement::params`] positionally; implementations
/// must never splice parameter values into the SQL text.
#[async_trait]
pub trait Store: Send + Sync {
    /// Run a read statement and return every row
    async fn query(&self, statement: &Statement) -> Result<Vec<Row>, StoreError>;

    /// Run a write statement and return the number of affected rows
    async fn execute(&self, statement: &Statement) -> Result<u64, StoreError>;
}

/// Decode untyped rows into a record type
///
/// Fails on the first row whose shape does not match `T`.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value::<T>(Value::Object(row)).map_err(|e| StoreError::Decode {
                message: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::CodeRow;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("row must be an object"),
        }
    }

    #[test]
    fn test_decode_matching_rows() {
        let rows = vec![
            row(json!({ "code": 120, "type": "Murder, Negligent Manslaughter" })),
            row(json!({ "code": 110, "type": "Murder, Non Negligent Manslaughter" })),
        ];

        let decoded: Vec<CodeRow> = decode_rows(rows).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].code, 120);
    }

    #[test]
    fn test_decode_shape_mismatch_fails() {
        let rows = vec![row(json!({ "code": "one-ten", "type": "Murder" }))];

        let err = decode_rows::<CodeRow>(rows).unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }

    #[test]
    fn test_decode_empty() {
        let decoded: Vec<CodeRow> = decode_rows(Vec::new()).unwrap();
        assert!(decoded.is_empty());
    }
}
