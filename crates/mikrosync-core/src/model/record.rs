// ── Records and tables ──

use indexmap::IndexMap;
use mikrosync_api::RawRecord;

use super::value::FieldValue;

/// Field name -> value for one entity.
pub type Record = IndexMap<String, FieldValue>;

/// Stable key -> record for one entity class. Keeps first-insertion order.
pub type Table = IndexMap<String, Record>;

/// Read a raw device field as a typed value. `None` when absent or `null`.
pub fn raw_field(raw: &RawRecord, field: &str) -> Option<FieldValue> {
    raw.get(field).and_then(FieldValue::from_json)
}

/// Read a raw field as a non-empty key string.
pub fn raw_key(raw: &RawRecord, field: &str) -> Option<String> {
    raw_field(raw, field)
        .filter(|v| !v.is_sentinel())
        .map(|v| v.to_string())
        .filter(|k| !k.is_empty())
}
