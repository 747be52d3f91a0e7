//! Response-shape tolerant decoding.
//!
//! Backends answer either with a bare JSON array or with an object that wraps
//! the array under a named field. Both decode to the same `Vec<T>`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::FetchError;

/// Object keys that may hold the record array, in lookup order
pub const WRAPPER_KEYS: [&str; 4] = ["items", "data", "results", "categories"];

/// Decode a response body into records, mapping failures to `FetchError::Parse`
///
/// The envelope shape is settled first; a record that then fails to decode is
/// reported with its index, the offending field when one can be singled out,
/// and serde's own message.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, FetchError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| FetchError::parse(format!("invalid JSON: {e}")))?;

    let records = match value {
        Value::Array(records) => records,
        Value::Object(mut map) => WRAPPER_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(records)) => Some(records),
                _ => None,
            })
            .ok_or_else(|| {
                FetchError::parse(format!(
                    "expected an array or an object with a {} array",
                    WRAPPER_KEYS.map(|key| format!("'{key}'")).join(", ")
                ))
            })?,
        _ => return Err(FetchError::parse("expected a JSON array or object")),
    };

    records
        .iter()
        .enumerate()
        .map(|(index, record)| decode_record(index, record))
        .collect()
}

fn decode_record<T: DeserializeOwned>(index: usize, record: &Value) -> Result<T, FetchError> {
    T::deserialize(record).map_err(|err| {
        let field = culprit::<T>(record)
            .map(|key| format!(", field '{key}'"))
            .unwrap_or_default();
        FetchError::parse(format!("record {index}{field}: {err}"))
    })
}

/// First key whose removal lets the record decode
fn culprit<T: DeserializeOwned>(record: &Value) -> Option<&str> {
    let map = record.as_object()?;
    map.keys().map(String::as_str).find(|key| {
        let mut rest = map.clone();
        rest.remove(*key);
        T::deserialize(&Value::Object(rest)).is_ok()
    })
}
