// ── Router snapshot ──

use serde::Serialize;

use super::record::{Record, Table};

/// Everything known about one router, as of the last completed cycle.
///
/// Owned by the poll worker; consumers receive it as an `Arc` snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouterData {
    pub routerboard: Record,
    pub resource: Record,
    /// Keyed by factory `default-name`.
    #[serde(rename = "interface")]
    pub interfaces: Table,
    /// Client identity per interface. Rebuilt from scratch every cycle.
    pub arp: Table,
    /// Destination NAT rules keyed by `.id`.
    pub nat: Table,
    #[serde(rename = "fw-update")]
    pub firmware: Record,
    /// Keyed by script name.
    #[serde(rename = "script")]
    pub scripts: Table,
}

impl RouterData {
    /// Look up an interface by its current display name.
    pub fn interface_by_name(&self, name: &str) -> Option<(&String, &Record)> {
        self.interfaces.iter().find(|(_, rec)| {
            rec.get("name")
                .is_some_and(|v| v.as_str() == Some(name))
        })
    }

    /// Whether a firmware check has produced a verdict yet.
    pub fn firmware_checked(&self) -> bool {
        self.firmware.contains_key("available")
    }

    pub fn firmware_update_available(&self) -> bool {
        self.firmware
            .get("available")
            .and_then(super::FieldValue::as_bool)
            .unwrap_or(false)
    }
}
