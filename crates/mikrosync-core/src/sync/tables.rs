// ── Entity rule tables ──
//
// Declarative shape of every keyed entity, plus the small amount of
// per-entity glue (filters, computed names) that rules cannot express.

use std::sync::LazyLock;

use mikrosync_api::RawRecord;
use tracing::{debug, error};

use super::merge::{KeyStrategy, MergeStats, merge};
use super::projector::FieldRule;
use crate::model::{FieldValue, Table, raw_field, raw_key};

pub static INTERFACE: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        FieldRule::new("default-name"),
        FieldRule::new("name").fallback_to("default-name"),
        FieldRule::new("type").with_default(FieldValue::Unknown),
        FieldRule::new("running").boolean(),
        FieldRule::new("enabled")
            .source("disabled")
            .boolean()
            .reversed()
            .with_default(true),
        FieldRule::new("port-mac-address").source("mac-address"),
        FieldRule::new("comment"),
        FieldRule::new("last-link-down-time"),
        FieldRule::new("last-link-up-time"),
        FieldRule::new("link-downs"),
        FieldRule::new("tx-queue-drop"),
        FieldRule::new("actual-mtu"),
    ]
});

/// Seeded once when an interface first appears.
pub static INTERFACE_ENSURE: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        FieldRule::new("client-ip-address"),
        FieldRule::new("client-mac-address"),
        FieldRule::new("rx-bits-per-second").with_default(0_i64),
        FieldRule::new("tx-bits-per-second").with_default(0_i64),
    ]
});

pub static TRAFFIC: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        FieldRule::new("rx-bits-per-second")
            .integer()
            .with_default(0_i64),
        FieldRule::new("tx-bits-per-second")
            .integer()
            .with_default(0_i64),
    ]
});

pub static NAT: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        FieldRule::new("name"),
        FieldRule::new(".id"),
        FieldRule::new("protocol"),
        FieldRule::new("dst-port"),
        FieldRule::new("in-interface").with_default("any"),
        FieldRule::new("to-addresses"),
        FieldRule::new("to-ports"),
        FieldRule::new("comment"),
        FieldRule::new("enabled")
            .source("disabled")
            .boolean()
            .reversed()
            .with_default(true),
    ]
});

pub static SCRIPT: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        FieldRule::new("name"),
        FieldRule::new("last-started").with_default(FieldValue::Unknown),
        FieldRule::new("run-count").with_default(FieldValue::Unknown),
    ]
});

const DST_NAT: &str = "dst-nat";

/// Merge `/interface` into the interface table, keyed by factory name.
/// Virtual interfaces have no `default-name` and are skipped.
pub fn merge_interfaces(table: &mut Table, records: &[RawRecord]) -> MergeStats {
    let stats = merge(
        table,
        records,
        KeyStrategy::Field("default-name"),
        &INTERFACE,
        &INTERFACE_ENSURE,
    );
    debug!(?stats, "merged interfaces");
    stats
}

/// Comma-joined display names, in table order, for the traffic monitor.
pub fn traffic_query(table: &Table) -> String {
    table
        .values()
        .filter_map(|rec| rec.get("name").filter(|v| !v.is_sentinel()))
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Fold a traffic sample into existing interfaces, matched by display name.
pub fn merge_traffic(table: &mut Table, records: &[RawRecord]) -> MergeStats {
    let stats = merge(table, records, KeyStrategy::Lookup("name"), &TRAFFIC, &[]);
    debug!(?stats, "merged traffic");
    stats
}

/// Merge destination NAT rules. Other actions are ignored.
pub fn merge_nat(table: &mut Table, records: &[RawRecord]) -> MergeStats {
    let rules: Vec<RawRecord> = records
        .iter()
        .filter(|raw| raw_key(raw, "action").as_deref() == Some(DST_NAT))
        .map(|raw| {
            let name = nat_name(raw);
            let mut raw = raw.clone();
            raw.insert("name".to_owned(), name.into());
            raw
        })
        .collect();

    let stats = merge(table, &rules, KeyStrategy::Field(".id"), &NAT, &[]);
    debug!(?stats, "merged NAT rules");
    stats
}

/// `"<protocol>:<dst-port>"`, with `any` standing in for a missing part.
pub fn nat_name(raw: &RawRecord) -> String {
    let protocol = raw_key(raw, "protocol").unwrap_or_else(|| "any".to_owned());
    let port = raw_key(raw, "dst-port").unwrap_or_else(|| "any".to_owned());
    format!("{protocol}:{port}")
}

/// Merge `/system/script`, keyed by name.
pub fn merge_scripts(table: &mut Table, records: &[RawRecord]) -> MergeStats {
    let mut rejected = 0;
    let named: Vec<RawRecord> = records
        .iter()
        .filter(|raw| match raw_field(raw, "name") {
            Some(name) if name.to_string().is_empty() => {
                error!(?raw, "script has an empty name, ignoring");
                rejected += 1;
                false
            }
            _ => true,
        })
        .cloned()
        .collect();

    let mut stats = merge(table, &named, KeyStrategy::Field("name"), &SCRIPT, &[]);
    stats.skipped += rejected;
    debug!(?stats, "merged scripts");
    stats
}
