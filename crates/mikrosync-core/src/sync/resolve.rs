// ── Cross-reference resolver ──
//
// ARP and bridge host entries name interfaces by their current display
// name. These helpers map them back onto the stable default-name key and
// fold the discovered client identity into the interface table.

use std::collections::HashMap;

use mikrosync_api::RawRecord;
use tracing::debug;

use crate::model::{FieldValue, Record, Table, raw_field, raw_key};

pub const CLIENT_IP: &str = "client-ip-address";
pub const CLIENT_MAC: &str = "client-mac-address";

const INTERFACE: &str = "interface";
const MAC: &str = "mac-address";
const ADDRESS: &str = "address";

/// Result of an ARP pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ArpIngest {
    /// Client identity per physical interface.
    pub arp: Table,
    /// MAC -> IP for hosts seen behind the bridge.
    pub mac_to_ip: HashMap<String, String>,
    /// At least one ARP entry sat on the bridge, so the bridge host table
    /// is needed to place those hosts on ports.
    pub bridge_used: bool,
}

/// Find the default-name of the interface currently called
/// `entry["interface"]`.
pub fn resolve_interface_uid(entry: &RawRecord, interfaces: &Table) -> Option<String> {
    let name = raw_key(entry, INTERFACE)?;
    interfaces
        .iter()
        .find(|(_, rec)| rec.get("name").and_then(FieldValue::as_str) == Some(name.as_str()))
        .map(|(uid, _)| uid.clone())
}

/// Build the ARP table from `/ip/arp` entries.
///
/// Entries on `bridge` are not attributed to any port; they only feed the
/// MAC -> IP side table.
pub fn ingest_arp(records: &[RawRecord], interfaces: &Table, bridge: &str) -> ArpIngest {
    let mut out = ArpIngest::default();

    for entry in records {
        if flag(entry, "invalid") {
            continue;
        }

        if raw_key(entry, INTERFACE).as_deref() == Some(bridge) {
            out.bridge_used = true;
            if let (Some(mac), Some(ip)) = (raw_key(entry, MAC), raw_key(entry, ADDRESS)) {
                out.mac_to_ip.insert(mac, ip);
            }
            continue;
        }

        let Some(uid) = resolve_interface_uid(entry, interfaces) else {
            continue;
        };

        debug!(%uid, ?entry, "processing ARP entry");
        let rec = out.arp.entry(uid.clone()).or_default();
        rec.insert(INTERFACE.to_owned(), FieldValue::Text(uid));
        collapse(rec, MAC, raw_field(entry, MAC));
        collapse(rec, ADDRESS, raw_field(entry, ADDRESS));
    }

    out
}

/// Place bridge hosts from `/interface/bridge/host` onto their ports.
pub fn ingest_bridge_hosts(
    records: &[RawRecord],
    mac_to_ip: &HashMap<String, String>,
    interfaces: &Table,
    arp: &mut Table,
) {
    for entry in records {
        // The bridge's own port MACs.
        if flag(entry, "local") {
            continue;
        }

        let Some(uid) = resolve_interface_uid(entry, interfaces) else {
            continue;
        };

        debug!(%uid, ?entry, "processing bridge host entry");
        let rec = arp.entry(uid.clone()).or_default();
        rec.insert(INTERFACE.to_owned(), FieldValue::Text(uid));

        if rec.contains_key(MAC) {
            rec.insert(MAC.to_owned(), FieldValue::Multiple);
            rec.insert(ADDRESS.to_owned(), FieldValue::Multiple);
            continue;
        }

        let mac = raw_key(entry, MAC).unwrap_or_default();
        let ip = mac_to_ip.get(&mac).cloned().unwrap_or_default();
        rec.insert(MAC.to_owned(), FieldValue::Text(mac));
        rec.insert(ADDRESS.to_owned(), FieldValue::Text(ip));
    }
}

/// Copy resolved identity onto interfaces. Interfaces without an ARP
/// entry keep whatever they had.
pub fn apply_clients(interfaces: &mut Table, arp: &Table) {
    for (uid, iface) in interfaces.iter_mut() {
        let Some(entry) = arp.get(uid) else {
            continue;
        };
        iface.insert(CLIENT_IP.to_owned(), field_or_empty(entry, ADDRESS));
        iface.insert(CLIENT_MAC.to_owned(), field_or_empty(entry, MAC));
    }
}

/// Mark client identity as switched off on every interface.
pub fn disable_clients(interfaces: &mut Table) {
    for iface in interfaces.values_mut() {
        iface.insert(CLIENT_IP.to_owned(), FieldValue::Disabled);
        iface.insert(CLIENT_MAC.to_owned(), FieldValue::Disabled);
    }
}

/// The first value is kept; any second value for the same port, even a
/// repeat, collapses the field to `Multiple`.
fn collapse(rec: &mut Record, field: &str, incoming: Option<FieldValue>) {
    let Some(incoming) = incoming else {
        return;
    };
    let value = if rec.contains_key(field) {
        FieldValue::Multiple
    } else {
        incoming
    };
    rec.insert(field.to_owned(), value);
}

fn flag(entry: &RawRecord, field: &str) -> bool {
    raw_field(entry, field).is_some_and(|v| v.is_truthy())
}

fn field_or_empty(rec: &Record, field: &str) -> FieldValue {
    rec.get(field).cloned().unwrap_or_else(FieldValue::empty)
}
