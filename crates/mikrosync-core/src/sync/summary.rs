// ── Singleton summarizers ──
//
// Resource, firmware and routerboard endpoints each return one record.
// These reduce it to the shape consumers read.

use std::sync::LazyLock;

use mikrosync_api::RawRecord;

use super::projector::{FieldRule, project_new};
use crate::model::{FieldValue, Record, raw_field};

/// Status text the router reports when a newer package is on the channel.
pub const UPDATE_AVAILABLE_STATUS: &str = "New version is available";

static RESOURCE: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    ["platform", "board-name", "version", "uptime", "cpu-load"]
        .into_iter()
        .map(|name| FieldRule::new(name).with_default(FieldValue::Unknown))
        .collect()
});

static FIRMWARE: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    ["channel", "installed-version", "latest-version"]
        .into_iter()
        .map(|name| FieldRule::new(name).with_default(FieldValue::Unknown))
        .collect()
});

static ROUTERBOARD: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        FieldRule::new("routerboard").boolean().with_default(false),
        FieldRule::new("model").with_default(FieldValue::Unknown),
        FieldRule::new("serial-number").with_default(FieldValue::Unknown),
        FieldRule::new("firmware")
            .source("current-firmware")
            .with_default(FieldValue::Unknown),
    ]
});

/// Reduce `/system/resource` to identity fields plus usage percentages.
pub fn summarize_resource(raw: &RawRecord) -> Record {
    let mut record = project_new(raw, &RESOURCE);
    record.insert(
        "memory-usage".to_owned(),
        usage_field(raw, "total-memory", "free-memory"),
    );
    record.insert(
        "hdd-usage".to_owned(),
        usage_field(raw, "total-hdd-space", "free-hdd-space"),
    );
    record
}

/// Reduce `/system/package/update` to a verdict plus version strings.
///
/// `available` only changes when the router actually reports a status;
/// a check without one keeps the previous verdict.
pub fn summarize_firmware(raw: &RawRecord, previous: &Record) -> Record {
    let mut record = Record::new();

    let available = match raw_field(raw, "status") {
        Some(status) => status.as_str() == Some(UPDATE_AVAILABLE_STATUS),
        None => previous
            .get("available")
            .and_then(FieldValue::as_bool)
            .unwrap_or(false),
    };
    record.insert("available".to_owned(), FieldValue::Bool(available));

    record.extend(project_new(raw, &FIRMWARE));
    record
}

/// Reduce `/system/routerboard` to hardware identity.
pub fn summarize_routerboard(raw: &RawRecord) -> Record {
    project_new(raw, &ROUTERBOARD)
}

/// Percentage of `total` in use, rounded half up. `None` when `total` is
/// zero or negative.
pub fn usage_percent(total: i64, free: i64) -> Option<i64> {
    if total <= 0 {
        return None;
    }
    let (total, free) = (i128::from(total), i128::from(free));
    let used = (total - free).clamp(0, total);
    i64::try_from((used * 100 + total / 2) / total).ok()
}

fn usage_field(raw: &RawRecord, total: &str, free: &str) -> FieldValue {
    let counter = |field| raw_field(raw, field).and_then(|v| v.as_i64());
    match (counter(total), counter(free)) {
        (Some(total), Some(free)) => {
            usage_percent(total, free).map_or(FieldValue::Unknown, FieldValue::Int)
        }
        _ => FieldValue::Unknown,
    }
}
