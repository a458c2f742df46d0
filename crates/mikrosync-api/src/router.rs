// ── Router collaborator trait ──
//
// The boundary between the reconciliation engine and whatever actually
// talks to the device.

use async_trait::async_trait;

use crate::error::Error;
use crate::record::RawRecord;

/// Management calls the poller needs from a router.
///
/// Implementations must return an empty list (not an error) when a menu
/// legitimately has no entries. Errors are reserved for transport and
/// authentication failures.
#[async_trait]
pub trait RouterApi: Send + Sync {
    /// Print every entry of a menu, e.g. `/interface`.
    async fn fetch(&self, path: &str) -> Result<Vec<RawRecord>, Error>;

    /// Sample live traffic once for a comma-joined list of interface names.
    async fn fetch_traffic(&self, interfaces: &str) -> Result<Vec<RawRecord>, Error>;

    /// Set `param = value` on the first entry of `path` whose `mod_param`
    /// equals `mod_value`. Returns `false` when no entry matched.
    async fn set_value(
        &self,
        path: &str,
        param: &str,
        value: &str,
        mod_param: &str,
        mod_value: &str,
    ) -> Result<bool, Error>;

    /// Run a script from `/system/script` by name.
    async fn run_script(&self, name: &str) -> Result<bool, Error>;
}
