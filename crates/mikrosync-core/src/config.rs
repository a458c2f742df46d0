// ── Runtime connection configuration ──
//
// These types describe how to reach one router and how often to poll it.
// They carry credential data and tuning, but never touch disk.
// The CLI constructs a `ControllerConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use mikrosync_api::{TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_FIRMWARE_INTERVAL: Duration = Duration::from_secs(3600);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_BRIDGE_INTERFACE: &str = "bridge";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed router certificates).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Configuration for polling a single router.
///
/// Built by the CLI, passed to `Controller`; core never reads config files.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Router URL (e.g. `https://192.168.88.1`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// Display name used in logs and the change signal name.
    pub name: String,
    pub tls: TlsVerification,
    /// Per-request timeout. A timed-out fetch fails that step only.
    pub timeout: Duration,
    /// Fast cycle cadence.
    pub scan_interval: Duration,
    /// Slow cycle (firmware check) cadence.
    pub firmware_interval: Duration,
    /// Resolve client MAC/IP per interface from ARP and bridge hosts.
    pub track_arp: bool,
    /// Name of the bridge whose hosts are placed onto ports.
    pub bridge_interface: String,
}

impl ControllerConfig {
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        let name = url.host_str().unwrap_or("router").to_owned();
        Self {
            url,
            username: username.into(),
            password,
            name,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            scan_interval: DEFAULT_SCAN_INTERVAL,
            firmware_interval: DEFAULT_FIRMWARE_INTERVAL,
            track_arp: true,
            bridge_interface: DEFAULT_BRIDGE_INTERFACE.to_owned(),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
        }
    }
}
