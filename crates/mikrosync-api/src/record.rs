// Raw device records.
//
// The router reports every entity as a flat JSON object. Values arrive as
// strings over REST and as native scalars from other transports, so
// consumers must not assume a particular JSON type per field.

/// One device-reported entity instance, exactly as received.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Flatten a decoded response body into a list of records.
///
/// Collection menus answer with an array of objects, singleton menus
/// (`/system/resource`) with a bare object. Non-object array members are
/// dropped. Returns `None` for any other shape.
pub fn records_from_value(value: serde_json::Value) -> Option<Vec<RawRecord>> {
    match value {
        serde_json::Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
        ),
        serde_json::Value::Object(map) => Some(vec![map]),
        serde_json::Value::Null => Some(Vec::new()),
        _ => None,
    }
}

/// Render a raw field as plain text, the way the router's CLI prints it.
pub fn field_text(record: &RawRecord, field: &str) -> Option<String> {
    match record.get(field)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn array_of_objects_becomes_records() {
        let records =
            records_from_value(json!([{ "name": "ether1" }, 42, { "name": "ether2" }])).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(field_text(&records[1], "name").as_deref(), Some("ether2"));
    }

    #[test]
    fn singleton_object_becomes_one_record() {
        let records = records_from_value(json!({ "cpu-load": "3" })).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn scalar_body_is_rejected() {
        assert!(records_from_value(json!("nope")).is_none());
    }

    #[test]
    fn field_text_renders_scalars() {
        let record = records_from_value(json!({ "mtu": 1500, "running": true, "x": null }))
            .unwrap()
            .remove(0);
        assert_eq!(field_text(&record, "mtu").as_deref(), Some("1500"));
        assert_eq!(field_text(&record, "running").as_deref(), Some("true"));
        assert_eq!(field_text(&record, "x"), None);
        assert_eq!(field_text(&record, "missing"), None);
    }
}
