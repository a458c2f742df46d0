// mikrosync-core: Reconciliation engine between mikrosync-api and consumers.
//
// Raw menu records flow through declarative field rules into keyed
// tables (`sync`), the `Poller` sequences those steps per cycle, and the
// `Controller` runs it as a single-writer actor with a change signal.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod poller;
pub mod store;
pub mod stream;
pub mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControllerConfig, TlsVerification};
pub use controller::{Controller, PollRequest};
pub use error::CoreError;
pub use model::{FieldValue, Record, RouterData, Table};
pub use poller::{PollOptions, Poller};
pub use store::{ConnectionState, DataStore};
pub use stream::{UpdateListener, UpdateStream};
