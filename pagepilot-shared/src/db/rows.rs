/// Result shape normalization
///
/// Some queries hand back a plain JSON array, others wrap the array in an
/// object (`{"rows": [...]}` from aggregate queries, `{"data": [...]}` from
/// the Graph API). Aggregates over empty tables come back as SQL `NULL`.
/// [`normalize_rows`] folds all of these into a `Vec`, so callers never have
/// to special-case a missing or malformed result.
///
/// # Example
///
/// ```
/// use pagepilot_shared::db::rows::normalize_rows;
/// use serde_json::json;
///
/// assert_eq!(normalize_rows(Some(&json!([1, 2]))).len(), 2);
/// assert_eq!(normalize_rows(Some(&json!({"rows": [1]}))).len(), 1);
/// assert!(normalize_rows(None).is_empty());
/// ```

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Envelope fields that may carry the row array
const ENVELOPE_FIELDS: [&str; 2] = ["rows", "data"];

/// Normalizes a query or API result into a list of rows
///
/// Returns an empty vector for `None`, `null`, scalars, and objects that do
/// not carry an array under `rows` or `data`.
pub fn normalize_rows(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Object(map)) => ENVELOPE_FIELDS
            .iter()
            .find_map(|field| match map.get(*field) {
                Some(Value::Array(items)) => Some(items.clone()),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Normalizes a result and deserializes each row into `T`
///
/// Rows that do not match `T` are skipped with a warning rather than failing
/// the whole result.
pub fn normalize_rows_as<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    normalize_rows(value)
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<T>(row) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed row");
                None
            }
        })
        .collect()
}
