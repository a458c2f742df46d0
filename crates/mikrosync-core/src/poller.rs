// ── Poll cycles ──
//
// `Poller` owns the canonical `RouterData` and runs the fast, slow and
// hardware cycles against a `RouterApi`. It is driven by exactly one
// task at a time, so no step ever races another.
//
// Every fetch is bounded by the request timeout. A failed or timed-out
// fetch leaves that step's data as it was and marks the router
// unreachable; the next cycle simply tries again.

use std::sync::Arc;
use std::time::Duration;

use mikrosync_api::{RawRecord, RouterApi, paths};
use tracing::{debug, warn};

use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::RouterData;
use crate::store::{ConnectionState, DataStore};
use crate::sync::{self, tables};

/// Knobs the poll cycles read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    pub track_arp: bool,
    pub bridge_interface: String,
    pub timeout: Duration,
}

impl From<&ControllerConfig> for PollOptions {
    fn from(config: &ControllerConfig) -> Self {
        Self {
            track_arp: config.track_arp,
            bridge_interface: config.bridge_interface.clone(),
            timeout: config.timeout,
        }
    }
}

pub struct Poller {
    api: Arc<dyn RouterApi>,
    store: Arc<DataStore>,
    options: PollOptions,
    data: RouterData,
    hwinfo_loaded: bool,
    /// Whether any fetch of the current cycle reached the router.
    reached: bool,
    last_error: Option<CoreError>,
}

impl Poller {
    pub fn new(api: Arc<dyn RouterApi>, store: Arc<DataStore>, options: PollOptions) -> Self {
        Self {
            api,
            store,
            options,
            data: RouterData::default(),
            hwinfo_loaded: false,
            reached: false,
            last_error: None,
        }
    }

    pub fn data(&self) -> &RouterData {
        &self.data
    }

    /// The error that kept the last cycle from reaching the router at all.
    /// `None` if at least one fetch succeeded.
    pub fn take_failure(&mut self) -> Option<CoreError> {
        if self.reached {
            return None;
        }
        self.last_error.take()
    }

    // ── Cycles ───────────────────────────────────────────────────────

    /// Fast cycle: interfaces, traffic, clients, NAT, resource, scripts.
    pub async fn update(&mut self) {
        self.begin_cycle();

        if !self.data.firmware_checked() {
            self.refresh_firmware().await;
        }
        if !self.hwinfo_loaded {
            self.refresh_routerboard().await;
        }

        self.refresh_interfaces().await;
        self.refresh_traffic().await;
        self.refresh_clients().await;
        self.refresh_nat().await;
        self.refresh_resource().await;
        self.refresh_scripts().await;

        self.finish_cycle("update");
    }

    /// Slow cycle: package update status.
    pub async fn firmware_check(&mut self) {
        self.begin_cycle();
        self.refresh_firmware().await;
        self.finish_cycle("firmware check");
    }

    /// Hardware identity and resource usage.
    pub async fn hwinfo_update(&mut self) {
        self.begin_cycle();
        self.refresh_routerboard().await;
        self.refresh_resource().await;
        self.finish_cycle("hwinfo update");
    }

    fn begin_cycle(&mut self) {
        self.reached = false;
        self.last_error = None;
    }

    fn finish_cycle(&self, cycle: &str) {
        self.store.publish(self.data.clone());
        self.store.notify();
        debug!(cycle, reached = self.reached, "poll cycle complete");
    }

    // ── Steps ────────────────────────────────────────────────────────

    async fn refresh_interfaces(&mut self) {
        if let Some(records) = self.fetch(paths::INTERFACE).await {
            tables::merge_interfaces(&mut self.data.interfaces, &records);
        }
    }

    async fn refresh_traffic(&mut self) {
        let names = tables::traffic_query(&self.data.interfaces);
        if names.is_empty() {
            return;
        }

        let api = Arc::clone(&self.api);
        let result = tokio::time::timeout(self.options.timeout, api.fetch_traffic(&names)).await;
        if let Some(records) = self.settle("/interface/monitor-traffic", result) {
            tables::merge_traffic(&mut self.data.interfaces, &records);
        }
    }

    async fn refresh_clients(&mut self) {
        self.data.arp.clear();

        if !self.options.track_arp {
            sync::disable_clients(&mut self.data.interfaces);
            return;
        }

        let Some(records) = self.fetch(paths::IP_ARP).await else {
            return;
        };
        let mut ingest = sync::ingest_arp(
            &records,
            &self.data.interfaces,
            &self.options.bridge_interface,
        );

        if ingest.bridge_used {
            if let Some(hosts) = self.fetch(paths::BRIDGE_HOST).await {
                sync::ingest_bridge_hosts(
                    &hosts,
                    &ingest.mac_to_ip,
                    &self.data.interfaces,
                    &mut ingest.arp,
                );
            }
        }

        self.data.arp = ingest.arp;
        sync::apply_clients(&mut self.data.interfaces, &self.data.arp);
    }

    async fn refresh_nat(&mut self) {
        if let Some(records) = self.fetch(paths::FIREWALL_NAT).await {
            tables::merge_nat(&mut self.data.nat, &records);
        }
    }

    async fn refresh_resource(&mut self) {
        if let Some(raw) = self.fetch_one(paths::SYSTEM_RESOURCE).await {
            self.data.resource = sync::summarize_resource(&raw);
        }
    }

    async fn refresh_scripts(&mut self) {
        if let Some(records) = self.fetch(paths::SYSTEM_SCRIPT).await {
            tables::merge_scripts(&mut self.data.scripts, &records);
        }
    }

    async fn refresh_firmware(&mut self) {
        if let Some(raw) = self.fetch_one(paths::PACKAGE_UPDATE).await {
            self.data.firmware = sync::summarize_firmware(&raw, &self.data.firmware);
        }
    }

    async fn refresh_routerboard(&mut self) {
        if let Some(raw) = self.fetch_one(paths::SYSTEM_ROUTERBOARD).await {
            self.data.routerboard = sync::summarize_routerboard(&raw);
            self.hwinfo_loaded = true;
        }
    }

    // ── Fetch plumbing ───────────────────────────────────────────────

    async fn fetch(&mut self, path: &str) -> Option<Vec<RawRecord>> {
        let api = Arc::clone(&self.api);
        let result = tokio::time::timeout(self.options.timeout, api.fetch(path)).await;
        self.settle(path, result)
    }

    /// Singleton menus: the first record, if the menu returned any.
    async fn fetch_one(&mut self, path: &str) -> Option<RawRecord> {
        self.fetch(path).await?.into_iter().next()
    }

    fn settle(
        &mut self,
        path: &str,
        result: Result<Result<Vec<RawRecord>, mikrosync_api::Error>, tokio::time::error::Elapsed>,
    ) -> Option<Vec<RawRecord>> {
        match result {
            Ok(Ok(records)) => {
                debug!(path, count = records.len(), "fetched");
                self.reached = true;
                self.store.set_connection(ConnectionState::Connected);
                Some(records)
            }
            Ok(Err(e)) => {
                warn!(path, error = %e, "fetch failed");
                self.fail(e.into());
                None
            }
            Err(_) => {
                let timeout_secs = self.options.timeout.as_secs();
                warn!(path, timeout_secs, "fetch timed out");
                self.fail(CoreError::Timeout { timeout_secs });
                None
            }
        }
    }

    fn fail(&mut self, error: CoreError) {
        self.store.mark_unreachable();
        self.last_error = Some(error);
    }
}
