// ── Reconciliation engine ──
//
// Pure functions from raw device records into the keyed model. Nothing
// here performs I/O; the poller feeds fetched batches through them.

pub mod merge;
pub mod projector;
pub mod resolve;
pub mod summary;
pub mod tables;

pub use merge::{KeyStrategy, MergeStats, merge};
pub use projector::{Coerce, FieldRule, project, project_new};
pub use resolve::{
    ArpIngest, apply_clients, disable_clients, ingest_arp, ingest_bridge_hosts,
    resolve_interface_uid,
};
pub use summary::{summarize_firmware, summarize_resource, summarize_routerboard, usage_percent};
