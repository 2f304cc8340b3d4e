use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Parameters for list/query operations.
#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    /// Maximum number of results to return.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Offset for pagination.
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

/// Result wrapper for list operations.
#[derive(Debug, Clone, Serialize)]
pub struct ListResult<T: Serialize> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string().replace('-', "")
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Parse a calendar date in the fixed `YYYY-MM-DD` form.
///
/// Workshop dates carry no time-of-day component; anything else (including
/// RFC 3339 timestamps) is rejected so entry/calibration/delivery dates stay
/// comparable. Stored dates are ordered lexicographically, so the zero
/// padding is part of the contract: chrono accepts "2024-1-10", we don't —
/// the parsed date must render back to exactly the input.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ServiceError> {
    let invalid = || {
        ServiceError::Validation(format!("{} must be a YYYY-MM-DD date, got '{}'", field, value))
    };
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
    if date.format("%Y-%m-%d").to_string() != value {
        return Err(invalid());
    }
    Ok(date)
}

/// Whole calendar days from `entry` to `exit`, clamped to be non-negative.
///
/// Date-only values make the difference an exact number of days already;
/// the clamp only matters for inconsistent stored data.
pub fn days_between(entry: NaiveDate, exit: NaiveDate) -> i64 {
    (exit - entry).num_days().max(0)
}

/// Merge a JSON patch into a base value.
///
/// For each key in `patch`:
/// - If the value is `null`, the key is removed from `base`.
/// - Otherwise, the key is set to the patch value.
///
/// This follows RFC 7386 (JSON Merge Patch) semantics.
pub fn merge_patch(
    base: &mut serde_json::Value,
    patch: &serde_json::Value,
) {
    if let (Some(base_obj), Some(patch_obj)) = (base.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_obj {
            if value.is_null() {
                base_obj.remove(key);
            } else if value.is_object() {
                // Recursively merge nested objects.
                let entry = base_obj
                    .entry(key.clone())
                    .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
                merge_patch(entry, value);
            } else {
                base_obj.insert(key.clone(), value.clone());
            }
        }
    } else {
        *base = patch.clone();
    }
}
