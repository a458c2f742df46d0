// ── Field projector ──
//
// A tiny interpreter over declarative field rules: pick a raw field,
// rename it, coerce it, invert it, or fall back to a default.

use mikrosync_api::RawRecord;

use crate::model::{FieldValue, Record, raw_field};

/// Type coercion applied to a raw value before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coerce {
    Bool,
    /// Integer counters. Text that does not parse is kept as text.
    Int,
}

/// How one target field is derived from a raw record.
///
/// Built with chained setters:
///
/// ```
/// use mikrosync_core::sync::FieldRule;
///
/// let enabled = FieldRule::new("enabled").source("disabled").boolean().reversed();
/// assert_eq!(enabled.source_name(), "disabled");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub name: &'static str,
    pub source: Option<&'static str>,
    pub coerce: Option<Coerce>,
    pub reverse: bool,
    pub default: Option<FieldValue>,
    pub fallback: Option<&'static str>,
}

impl FieldRule {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            source: None,
            coerce: None,
            reverse: false,
            default: None,
            fallback: None,
        }
    }

    /// Read from a differently named raw field.
    pub fn source(mut self, source: &'static str) -> Self {
        self.source = Some(source);
        self
    }

    /// Coerce the raw value to a boolean.
    pub fn boolean(mut self) -> Self {
        self.coerce = Some(Coerce::Bool);
        self
    }

    /// Coerce the raw value to an integer.
    pub fn integer(mut self) -> Self {
        self.coerce = Some(Coerce::Int);
        self
    }

    /// Invert the boolean after coercion ("disabled" -> "enabled").
    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Value used when the raw field is absent.
    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// When the raw field is absent, copy this already-projected field.
    pub fn fallback_to(mut self, field: &'static str) -> Self {
        self.fallback = Some(field);
        self
    }

    pub fn source_name(&self) -> &'static str {
        self.source.unwrap_or(self.name)
    }

    /// Derive this rule's value. `target` is the record being built, read
    /// only for the fallback field. `None` means "leave the field alone".
    pub fn evaluate(&self, raw: &RawRecord, target: &Record) -> Option<FieldValue> {
        if let Some(value) = raw_field(raw, self.source_name()) {
            let value = match self.coerce {
                Some(Coerce::Bool) => FieldValue::Bool(value.is_truthy()),
                Some(Coerce::Int) => value.as_i64().map_or(value, FieldValue::Int),
                None => value,
            };
            return Some(match value {
                FieldValue::Bool(b) if self.reverse => FieldValue::Bool(!b),
                other => other,
            });
        }

        self.fallback
            .and_then(|field| target.get(field).cloned())
            .or_else(|| self.default.clone())
    }
}

/// Apply `rules` in order, writing into `target`.
pub fn project(raw: &RawRecord, rules: &[FieldRule], target: &mut Record) {
    for rule in rules {
        if let Some(value) = rule.evaluate(raw, target) {
            target.insert(rule.name.to_owned(), value);
        }
    }
}

/// Project into a fresh record.
pub fn project_new(raw: &RawRecord, rules: &[FieldRule]) -> Record {
    let mut record = Record::new();
    project(raw, rules, &mut record);
    record
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn raw(value: serde_json::Value) -> RawRecord {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn renames_from_source_field() {
        let rules = [FieldRule::new("port-mac-address").source("mac-address")];
        let rec = project_new(&raw(json!({ "mac-address": "AA:BB" })), &rules);
        assert_eq!(rec.get("port-mac-address"), Some(&FieldValue::from("AA:BB")));
        assert!(!rec.contains_key("mac-address"));
    }

    #[test]
    fn absent_field_without_default_is_omitted() {
        let rules = [FieldRule::new("comment")];
        let rec = project_new(&raw(json!({ "name": "ether1" })), &rules);
        assert!(rec.is_empty());
    }

    #[test]
    fn absent_field_uses_default() {
        let rules = [FieldRule::new("type").with_default(FieldValue::Unknown)];
        let rec = project_new(&raw(json!({})), &rules);
        assert_eq!(rec.get("type"), Some(&FieldValue::Unknown));
    }

    #[test]
    fn reverse_applies_after_coercion() {
        let rules = [FieldRule::new("enabled")
            .source("disabled")
            .boolean()
            .reversed()
            .with_default(true)];
        let off = project_new(&raw(json!({ "disabled": "true" })), &rules);
        let on = project_new(&raw(json!({ "disabled": false })), &rules);
        assert_eq!(off.get("enabled"), Some(&FieldValue::Bool(false)));
        assert_eq!(on.get("enabled"), Some(&FieldValue::Bool(true)));
    }

    #[test]
    fn default_is_not_reversed() {
        let rules = [FieldRule::new("enabled")
            .source("disabled")
            .boolean()
            .reversed()
            .with_default(true)];
        let rec = project_new(&raw(json!({})), &rules);
        assert_eq!(rec.get("enabled"), Some(&FieldValue::Bool(true)));
    }

    #[test]
    fn unrecognised_text_coerces_to_false() {
        let rules = [FieldRule::new("running").boolean()];
        let rec = project_new(&raw(json!({ "running": "maybe" })), &rules);
        assert_eq!(rec.get("running"), Some(&FieldValue::Bool(false)));
    }

    #[test]
    fn integer_coercion_parses_counters() {
        let rules = [
            FieldRule::new("rx").integer(),
            FieldRule::new("tx").integer(),
            FieldRule::new("drops").integer(),
        ];
        let rec = project_new(&raw(json!({ "rx": "1200", "tx": 800, "drops": "n/a" })), &rules);
        assert_eq!(rec.get("rx"), Some(&FieldValue::Int(1200)));
        assert_eq!(rec.get("tx"), Some(&FieldValue::Int(800)));
        assert_eq!(rec.get("drops"), Some(&FieldValue::from("n/a")));
    }

    #[test]
    fn fallback_copies_projected_field() {
        let rules = [
            FieldRule::new("default-name"),
            FieldRule::new("name").fallback_to("default-name"),
        ];
        let cleared = project_new(&raw(json!({ "default-name": "ether1" })), &rules);
        assert_eq!(cleared.get("name"), Some(&FieldValue::from("ether1")));

        let renamed =
            project_new(&raw(json!({ "default-name": "ether1", "name": "wan" })), &rules);
        assert_eq!(renamed.get("name"), Some(&FieldValue::from("wan")));
    }
}
