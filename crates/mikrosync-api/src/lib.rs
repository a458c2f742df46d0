// mikrosync-api: Async client for the RouterOS management API.
//
// The `RouterApi` trait is the only surface `mikrosync-core` talks to.
// `RestClient` implements it over the RouterOS v7 REST interface;
// tests substitute scripted fakes.

pub mod error;
pub mod paths;
pub mod record;
pub mod rest;
pub mod router;
pub mod transport;

pub use error::Error;
pub use record::RawRecord;
pub use rest::RestClient;
pub use router::RouterApi;
pub use transport::{TlsMode, TransportConfig};
