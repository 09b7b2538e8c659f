//! Result projection
//!
//! Store records carry the selected columns under their uppercase logical
//! names plus store-internal metadata. Projection keeps exactly the caller's
//! output columns, re-keyed to lowercase.

use serde_json::{Map, Value};

use crate::error::{FilterError, Result};

/// A record as returned by the store
pub type RawRecord = Map<String, Value>;

/// A record as returned to the caller: lowercase output columns only
pub type ProjectedRecord = Map<String, Value>;

/// Fields the document store adds to every record
pub const STORE_METADATA_FIELDS: [&str; 5] = ["_rid", "_self", "_etag", "_attachments", "_ts"];

/// Metadata names match regardless of case, so the uppercased `_TS` of a
/// request is still recognized.
pub fn is_metadata_field(name: &str) -> bool {
    STORE_METADATA_FIELDS
        .iter()
        .any(|field| field.eq_ignore_ascii_case(name))
}

/// Project every raw record down to `output_columns` (uppercase).
///
/// A record missing one of the requested columns is a schema mismatch and
/// fails the whole projection. Metadata fields are never looked up, even if
/// a requested column happens to carry the same name.
pub fn project_records(records: &[RawRecord], output_columns: &[String]) -> Result<Vec<ProjectedRecord>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| project_record(record, output_columns, index))
        .collect()
}

fn project_record(record: &RawRecord, output_columns: &[String], index: usize) -> Result<ProjectedRecord> {
    let mut projected = Map::with_capacity(output_columns.len());

    for column in output_columns {
        let value = (!is_metadata_field(column))
            .then(|| record.get(column))
            .flatten()
            .ok_or_else(|| {
                FilterError::projection(format!(
                    "record {} has no column '{}'",
                    index, column
                ))
            })?;

        projected.insert(column.to_lowercase(), value.clone());
    }

    Ok(projected)
}

/// Column names of a sampled record, without store metadata
pub fn data_columns(record: &RawRecord) -> Vec<String> {
    record
        .keys()
        .filter(|key| !is_metadata_field(key))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn columns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_projects_requested_columns_lowercased() {
        let raw = vec![record(json!({"NAME": "Ada", "AGE": 36, "CITY": "London"}))];

        let projected = project_records(&raw, &columns(&["NAME", "AGE"])).unwrap();

        assert_eq!(projected.len(), 1);
        assert_eq!(Value::Object(projected[0].clone()), json!({"name": "Ada", "age": 36}));
    }

    #[test]
    fn test_keys_follow_output_order() {
        let raw = vec![record(json!({"NAME": "Ada", "AGE": 36}))];

        let projected = project_records(&raw, &columns(&["AGE", "NAME"])).unwrap();

        let keys: Vec<&String> = projected[0].keys().collect();
        assert_eq!(keys, ["age", "name"]);
    }

    #[test]
    fn test_metadata_never_leaks() {
        let raw = vec![record(json!({
            "NAME": "Ada",
            "AGE": 36,
            "_rid": "abc==",
            "_self": "dbs/x/colls/y/docs/z",
            "_etag": "\"0000\"",
            "_attachments": "attachments/",
            "_ts": 1700000000
        }))];

        let projected = project_records(&raw, &columns(&["NAME"])).unwrap();

        assert_eq!(Value::Object(projected[0].clone()), json!({"name": "Ada"}));
    }

    #[test]
    fn test_metadata_name_is_never_looked_up() {
        let raw = vec![record(json!({"NAME": "Ada", "_ts": 1, "_TS": 1}))];

        let err = project_records(&raw, &columns(&["_TS"])).unwrap_err();
        assert_eq!(err.code(), 9009);
        assert!(is_metadata_field("_Etag"));
        assert!(!is_metadata_field("TS"));
    }

    #[test]
    fn test_missing_column_is_a_hard_fault() {
        let raw = vec![
            record(json!({"NAME": "Ada", "AGE": 36})),
            record(json!({"NAME": "Alan"})),
        ];

        let err = project_records(&raw, &columns(&["NAME", "AGE"])).unwrap_err();

        assert_eq!(err.code(), 9009);
        assert!(err.to_string().contains("record 1 has no column 'AGE'"));
    }

    #[test]
    fn test_null_values_are_kept() {
        let raw = vec![record(json!({"NAME": null}))];
        let projected = project_records(&raw, &columns(&["NAME"])).unwrap();
        assert_eq!(projected[0].get("name"), Some(&Value::Null));
    }

    #[test]
    fn test_empty_input() {
        assert!(project_records(&[], &columns(&["NAME"])).unwrap().is_empty());
    }

    #[test]
    fn test_data_columns_strip_metadata() {
        let sample = record(json!({"id": "1", "NAME": "Ada", "_rid": "x", "_ts": 2}));
        assert_eq!(data_columns(&sample), ["id", "NAME"]);
    }
}
