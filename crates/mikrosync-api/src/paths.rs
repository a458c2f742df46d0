// Menu paths polled by the reconciliation engine.
//
// Paths use the CLI menu form (`/ip/arp`); the REST client maps them onto
// `/rest/ip/arp`.

pub const INTERFACE: &str = "/interface";
pub const IP_ARP: &str = "/ip/arp";
pub const BRIDGE_HOST: &str = "/interface/bridge/host";
pub const FIREWALL_NAT: &str = "/ip/firewall/nat";
pub const SYSTEM_ROUTERBOARD: &str = "/system/routerboard";
pub const SYSTEM_RESOURCE: &str = "/system/resource";
pub const PACKAGE_UPDATE: &str = "/system/package/update";
pub const SYSTEM_SCRIPT: &str = "/system/script";
