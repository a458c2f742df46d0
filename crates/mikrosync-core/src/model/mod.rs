// ── Domain model ──
//
// Generic record/table types plus the per-router snapshot that holds
// them. Field-level typing lives in `FieldValue`; entity shape is defined
// declaratively by the rule tables in `sync::tables`.

pub mod record;
pub mod router;
pub mod value;

pub use record::{Record, Table, raw_field, raw_key};
pub use router::RouterData;
pub use value::FieldValue;
