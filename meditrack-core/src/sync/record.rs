//! Conversions between typed records and the JSON rows sent to the stores.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::entity::{EntityKind, Record};
use crate::error::{RemoteError, SyncError, ValidationError};

/// Serializes a record or field set into a JSON object.
pub(crate) fn to_record<T: Serialize>(kind: EntityKind, value: &T) -> Result<Record, SyncError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Ok(Record::new()),
        Err(source) => Err(SyncError::Encode { kind, source }),
    }
}

/// Builds a typed record from a row assembled locally.
pub(crate) fn from_record<T: DeserializeOwned>(
    kind: EntityKind,
    record: Record,
) -> Result<T, SyncError> {
    serde_json::from_value(Value::Object(record)).map_err(|source| SyncError::Encode { kind, source })
}

/// Fills every default of `E` into a freshly assembled row.
pub(crate) fn complete<E>(kind: EntityKind, record: Record) -> Result<Record, SyncError>
where
    E: Serialize + DeserializeOwned,
{
    let typed: E = from_record(kind, record)?;
    to_record(kind, &typed)
}

/// Builds a typed record from a row returned by the remote store.
pub(crate) fn from_remote<T: DeserializeOwned>(
    kind: EntityKind,
    record: Record,
) -> Result<T, RemoteError> {
    serde_json::from_value(Value::Object(record))
        .map_err(|e| RemoteError::Decode(format!("{} row: {}", kind, e)))
}

/// A field counts as missing when absent, null or blank text.
fn is_missing(record: &Record, field: &str) -> bool {
    match record.get(field) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Rejects a field set that lacks any of `required`.
pub(crate) fn validate(
    kind: EntityKind,
    record: &Record,
    required: &'static [&'static str],
) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = required
        .iter()
        .copied()
        .filter(|field| is_missing(record, field))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields { kind, missing })
    }
}

pub(crate) fn timestamp(now: DateTime<Utc>) -> Value {
    Value::String(now.to_rfc3339())
}

/// Overlays `patch` onto `base`, key by key.
pub(crate) fn merge(mut base: Record, patch: &Record) -> Record {
    for (key, value) in patch {
        base.insert(key.clone(), value.clone());
    }
    base
}

/// The `id` column of a row, when it is text.
pub(crate) fn row_id(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_validate_reports_missing_in_order() {
        let fields = record(json!({"gender": "Male"}));
        let err = validate(EntityKind::Patients, &fields, &["name", "age", "gender"]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields {
                kind: EntityKind::Patients,
                missing: vec!["name", "age"],
            }
        );
    }

    #[test]
    fn test_blank_and_null_are_missing() {
        let fields = record(json!({"name": "   ", "age": null}));
        let err = validate(EntityKind::Patients, &fields, &["name", "age"]).unwrap_err();
        assert!(matches!(err, ValidationError::MissingFields { missing, .. } if missing.len() == 2));
    }

    #[test]
    fn test_zero_counts_as_present() {
        let fields = record(json!({"name": "Baby Doe", "age": 0, "gender": "Female"}));
        assert!(validate(EntityKind::Patients, &fields, &["name", "age", "gender"]).is_ok());
    }

    #[test]
    fn test_merge_overwrites_keys() {
        let base = record(json!({"id": "P001", "name": "John", "age": 45}));
        let patch = record(json!({"name": "Johnny", "phone": "555"}));
        let merged = merge(base, &patch);
        assert_eq!(
            Value::Object(merged),
            json!({"id": "P001", "name": "Johnny", "age": 45, "phone": "555"})
        );
    }

    #[test]
    fn test_from_remote_reports_decode_error() {
        let row = record(json!({"id": "P001", "age": "not a number"}));
        let result: Result<crate::models::Patient, _> = from_remote(EntityKind::Patients, row);
        assert!(matches!(result, Err(RemoteError::Decode(_))));
    }
}
