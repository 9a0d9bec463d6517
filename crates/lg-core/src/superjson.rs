//! # SuperJSON envelope
//!
//! The leads endpoint answers in the SuperJSON layout so browser clients get
//! `Date` objects back:
//!
//! ```json
//! { "json": { "data": [{ "lastActivity": "2024-01-01T00:00:00.000Z" }] },
//!   "meta": { "values": { "data.0.lastActivity": ["Date"] } } }
//! ```
//!
//! Dates are already ISO strings in `json`; `meta.values` only annotates
//! their paths.

use crate::response::LeadsResponse;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

const DATE: &str = "Date";

#[derive(Debug, thiserror::Error)]
pub enum SuperJsonError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("envelope has no `json` member")]
    MissingJson,
    #[error("unsupported annotation `{kind}` at `{path}`")]
    UnsupportedAnnotation { path: String, kind: String },
}

/// Paths of every date in a response, in document order.
pub fn date_paths(response: &LeadsResponse) -> Vec<String> {
    let mut paths = Vec::new();
    for (i, row) in response.data.iter().enumerate() {
        if row.lead.claim_at.is_some() {
            paths.push(format!("data.{i}.claimAt"));
        }
        paths.push(format!("data.{i}.lastActivity"));
    }
    paths
}

/// Wrap an already-serialized value with annotations for `dates`.
pub fn envelope(json: Value, dates: impl IntoIterator<Item = String>) -> Value {
    let values: Map<String, Value> = dates
        .into_iter()
        .map(|path| (path, json!([DATE])))
        .collect();
    if values.is_empty() {
        json!({ "json": json })
    } else {
        json!({ "json": json, "meta": { "values": values } })
    }
}

pub fn to_value(response: &LeadsResponse) -> Result<Value, serde_json::Error> {
    Ok(envelope(serde_json::to_value(response)?, date_paths(response)))
}

pub fn to_string(response: &LeadsResponse) -> Result<String, serde_json::Error> {
    serde_json::to_string(&to_value(response)?)
}

/// Unwrap an envelope. Only `Date` annotations are understood; dates are
/// decoded by the target type's own deserializer.
pub fn from_str<T: DeserializeOwned>(body: &str) -> Result<T, SuperJsonError> {
    let mut root: Value = serde_json::from_str(body)?;
    if let Some(values) = root.pointer("/meta/values").and_then(Value::as_object) {
        for (path, annotation) in values {
            let kind = annotation
                .get(0)
                .and_then(Value::as_str)
                .unwrap_or_default();
            if kind != DATE {
                return Err(SuperJsonError::UnsupportedAnnotation {
                    path: path.clone(),
                    kind: annotation.to_string(),
                });
            }
        }
    }
    let json = root
        .get_mut("json")
        .map(Value::take)
        .ok_or(SuperJsonError::MissingJson)?;
    Ok(serde_json::from_value(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::Lead;
    use crate::params::decode;
    use crate::response::execute;
    use crate::time::from_millis;

    fn response() -> LeadsResponse {
        let now = from_millis(1_700_000_000_000).unwrap();
        let mut claimed = Lead::new("a", from_millis(1_699_999_000_000).unwrap());
        claimed.claim_at = Some(from_millis(1_699_999_500_000).unwrap());
        let open = Lead::new("b", from_millis(1_699_998_000_000).unwrap());
        execute(vec![claimed, open], &decode("", now), now)
    }

    #[test]
    fn test_annotates_every_date() {
        let value = to_value(&response()).unwrap();
        let values = value["meta"]["values"].as_object().unwrap();
        let keys: Vec<&str> = values.keys().map(String::as_str).collect();
        assert!(keys.contains(&"data.0.claimAt"));
        assert!(keys.contains(&"data.0.lastActivity"));
        assert!(keys.contains(&"data.1.lastActivity"));
        assert!(!keys.contains(&"data.1.claimAt"));
        assert_eq!(values["data.0.lastActivity"], json!(["Date"]));
        assert_eq!(value["json"]["data"][0]["lastActivity"], "2023-11-14T21:56:40.000Z");
    }

    #[test]
    fn test_unwraps_envelope() {
        let original = response();
        let back: LeadsResponse = from_str(&to_string(&original).unwrap()).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_rejects_bad_envelopes() {
        assert!(matches!(
            from_str::<Value>(r#"{"meta":{}}"#),
            Err(SuperJsonError::MissingJson)
        ));
        assert!(matches!(
            from_str::<Value>(r#"{"json":1,"meta":{"values":{"x":["bigint"]}}}"#),
            Err(SuperJsonError::UnsupportedAnnotation { .. })
        ));
        assert!(matches!(from_str::<Value>("{"), Err(SuperJsonError::Json(_))));
    }

    #[test]
    fn test_plain_envelope_without_dates() {
        let value = envelope(json!({"n": 1}), Vec::new());
        assert_eq!(value, json!({"json": {"n": 1}}));
        assert_eq!(from_str::<Value>(&value.to_string()).unwrap(), json!({"n": 1}));
    }
}
