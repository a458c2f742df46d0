// ── Table merger ──
//
// Create-on-miss, update-on-hit, never delete. Ensure rules seed a record
// only when its key is first seen, so derived fields (traffic rates,
// client identity) survive until a real sample overwrites them.

use std::collections::HashMap;

use mikrosync_api::RawRecord;
use tracing::debug;

use super::projector::{FieldRule, project};
use crate::model::{FieldValue, Record, Table, raw_key};

/// How a raw record finds its table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy<'a> {
    /// The raw record carries the key in this field.
    Field(&'a str),
    /// Match an existing entry whose value of this field equals the raw
    /// record's own value of the same field. Never creates entries.
    Lookup(&'a str),
}

/// Outcome counters for one merge pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Merge a batch of raw records into `table`.
pub fn merge(
    table: &mut Table,
    records: &[RawRecord],
    key: KeyStrategy<'_>,
    rules: &[FieldRule],
    ensure: &[FieldRule],
) -> MergeStats {
    let mut stats = MergeStats::default();

    let keymap = match key {
        KeyStrategy::Lookup(field) => build_keymap(table, field),
        KeyStrategy::Field(_) => HashMap::new(),
    };

    for raw in records {
        let uid = match key {
            KeyStrategy::Field(field) => raw_key(raw, field),
            KeyStrategy::Lookup(field) => {
                raw_key(raw, field).and_then(|value| keymap.get(&value).cloned())
            }
        };

        let Some(uid) = uid else {
            debug!(?key, "record has no resolvable key, skipping");
            stats.skipped += 1;
            continue;
        };

        if let Some(record) = table.get_mut(&uid) {
            project(raw, rules, record);
            stats.updated += 1;
        } else {
            let mut record = Record::new();
            apply_ensure(&mut record, ensure);
            project(raw, rules, &mut record);
            table.insert(uid, record);
            stats.created += 1;
        }
    }

    stats
}

/// Seed first-seen fields. A rule without a default seeds empty text.
fn apply_ensure(record: &mut Record, ensure: &[FieldRule]) {
    for rule in ensure {
        let value = rule.default.clone().unwrap_or_else(FieldValue::empty);
        record.insert(rule.name.to_owned(), value);
    }
}

/// Index current values of `field` back to their table keys.
fn build_keymap(table: &Table, field: &str) -> HashMap<String, String> {
    table
        .iter()
        .filter_map(|(uid, record)| {
            record
                .get(field)
                .filter(|v| !v.is_sentinel())
                .map(|v| (v.to_string(), uid.clone()))
        })
        .collect()
}
