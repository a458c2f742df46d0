//! Output formatting: table, JSON, plain.
//!
//! Renders snapshot sections in the format selected by `--output`. Table
//! uses `tabled`, structured formats use serde, plain emits one key per
//! line.

use std::io::{self, Write};

use tabled::{Table, Tabled, settings::Style};

use mikrosync_core::{FieldValue, Record, RouterData};

use crate::cli::{OutputFormat, Section};
use crate::error::CliError;

// ── Row types ────────────────────────────────────────────────────────

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Port")]
    default_name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Up")]
    running: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Client IP")]
    client_ip: String,
    #[tabled(rename = "Client MAC")]
    client_mac: String,
    #[tabled(rename = "RX bps")]
    rx: String,
    #[tabled(rename = "TX bps")]
    tx: String,
}

#[derive(Tabled)]
struct NatRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "In")]
    in_interface: String,
    #[tabled(rename = "To address")]
    to_addresses: String,
    #[tabled(rename = "To port")]
    to_ports: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Comment")]
    comment: String,
}

#[derive(Tabled)]
struct ScriptRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Runs")]
    run_count: String,
    #[tabled(rename = "Last started")]
    last_started: String,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn cell(record: &Record, field: &str) -> String {
    record.get(field).map(FieldValue::to_string).unwrap_or_default()
}

fn interface_row(record: &Record) -> InterfaceRow {
    InterfaceRow {
        name: cell(record, "name"),
        default_name: cell(record, "default-name"),
        kind: cell(record, "type"),
        running: cell(record, "running"),
        enabled: cell(record, "enabled"),
        client_ip: cell(record, "client-ip-address"),
        client_mac: cell(record, "client-mac-address"),
        rx: cell(record, "rx-bits-per-second"),
        tx: cell(record, "tx-bits-per-second"),
    }
}

fn nat_row(record: &Record) -> NatRow {
    NatRow {
        name: cell(record, "name"),
        in_interface: cell(record, "in-interface"),
        to_addresses: cell(record, "to-addresses"),
        to_ports: cell(record, "to-ports"),
        enabled: cell(record, "enabled"),
        comment: cell(record, "comment"),
    }
}

fn script_row(record: &Record) -> ScriptRow {
    ScriptRow {
        name: cell(record, "name"),
        run_count: cell(record, "run-count"),
        last_started: cell(record, "last-started"),
    }
}

fn field_rows(record: &Record) -> Vec<FieldRow> {
    record
        .iter()
        .map(|(field, value)| FieldRow {
            field: field.clone(),
            value: value.to_string(),
        })
        .collect()
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render one section (or all of them) of a snapshot.
pub fn render_snapshot(
    format: OutputFormat,
    data: &RouterData,
    section: Section,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => render_section_json(data, section, false),
        OutputFormat::JsonCompact => render_section_json(data, section, true),
        OutputFormat::Table => Ok(render_section_table(data, section)),
        OutputFormat::Plain => Ok(render_section_plain(data, section)),
    }
}

fn render_section_json(
    data: &RouterData,
    section: Section,
    compact: bool,
) -> Result<String, CliError> {
    match section {
        Section::All => render_json(data, compact),
        Section::Interfaces => render_json(&data.interfaces, compact),
        Section::Nat => render_json(&data.nat, compact),
        Section::Scripts => render_json(&data.scripts, compact),
        Section::Resource => render_json(&data.resource, compact),
        Section::Firmware => render_json(&data.firmware, compact),
        Section::Routerboard => render_json(&data.routerboard, compact),
    }
}

fn render_section_table(data: &RouterData, section: Section) -> String {
    match section {
        Section::All => [
            Section::Routerboard,
            Section::Resource,
            Section::Firmware,
            Section::Interfaces,
            Section::Nat,
            Section::Scripts,
        ]
        .into_iter()
        .map(|s| format!("{}\n{}", heading(s), render_section_table(data, s)))
        .collect::<Vec<_>>()
        .join("\n\n"),
        Section::Interfaces => {
            render_table(&data.interfaces.values().map(interface_row).collect::<Vec<_>>())
        }
        Section::Nat => render_table(&data.nat.values().map(nat_row).collect::<Vec<_>>()),
        Section::Scripts => {
            render_table(&data.scripts.values().map(script_row).collect::<Vec<_>>())
        }
        Section::Resource => render_table(&field_rows(&data.resource)),
        Section::Firmware => render_table(&field_rows(&data.firmware)),
        Section::Routerboard => render_table(&field_rows(&data.routerboard)),
    }
}

fn render_section_plain(data: &RouterData, section: Section) -> String {
    let keys = |table: &mikrosync_core::Table| {
        table.keys().cloned().collect::<Vec<_>>().join("\n")
    };
    let fields = |record: &Record| {
        record
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    match section {
        Section::All | Section::Interfaces => keys(&data.interfaces),
        Section::Nat => keys(&data.nat),
        Section::Scripts => keys(&data.scripts),
        Section::Resource => fields(&data.resource),
        Section::Firmware => fields(&data.firmware),
        Section::Routerboard => fields(&data.routerboard),
    }
}

fn heading(section: Section) -> &'static str {
    match section {
        Section::All => "Snapshot",
        Section::Interfaces => "Interfaces",
        Section::Nat => "Destination NAT",
        Section::Scripts => "Scripts",
        Section::Resource => "Resource",
        Section::Firmware => "Firmware",
        Section::Routerboard => "Routerboard",
    }
}

/// One line per completed cycle, for `watch`.
pub fn render_cycle_line(
    format: OutputFormat,
    data: &RouterData,
    at: chrono::DateTime<chrono::Local>,
) -> Result<String, CliError> {
    if matches!(format, OutputFormat::Json | OutputFormat::JsonCompact) {
        return render_json(data, true);
    }

    let up = data
        .interfaces
        .values()
        .filter(|rec| rec.get("running").is_some_and(FieldValue::is_truthy))
        .count();
    Ok(format!(
        "{} interfaces={} up={} cpu={} mem={}% hdd={}% update={}",
        at.format("%H:%M:%S"),
        data.interfaces.len(),
        up,
        cell(&data.resource, "cpu-load"),
        cell(&data.resource, "memory-usage"),
        cell(&data.resource, "hdd-usage"),
        data.firmware_update_available(),
    ))
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(rendered)
}
