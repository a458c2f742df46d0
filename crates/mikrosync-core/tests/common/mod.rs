// Shared fixtures for poller and controller tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mikrosync_api::{Error, RawRecord, RouterApi};
use serde_json::{Value, json};

/// Scripted in-memory router. Responses are set per path; any path can be
/// made to fail or hang. Every call is logged.
#[derive(Default)]
pub struct FakeRouter {
    responses: Mutex<HashMap<String, Vec<RawRecord>>>,
    failing: Mutex<HashSet<String>>,
    hanging: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

pub const TRAFFIC: &str = "/interface/monitor-traffic";

impl FakeRouter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A small home router: ether1 renamed to "wan", ether2 on the bridge.
    pub fn home() -> Arc<Self> {
        let router = Self::new();
        router.respond(
            "/interface",
            json!([
                { "default-name": "ether1", "name": "wan", "type": "ether",
                  "running": "true", "disabled": "false", "mac-address": "CC:00:00:00:00:01" },
                { "default-name": "ether2", "name": "ether2", "type": "ether",
                  "running": "true", "disabled": "false", "mac-address": "CC:00:00:00:00:02" },
                { "name": "bridge", "type": "bridge", "running": "true", "disabled": "false" },
            ]),
        );
        router.respond(
            TRAFFIC,
            json!([
                { "name": "wan", "rx-bits-per-second": "4000", "tx-bits-per-second": "1000" },
                { "name": "ether2", "rx-bits-per-second": "20", "tx-bits-per-second": "30" },
            ]),
        );
        router.respond(
            "/ip/arp",
            json!([
                { "interface": "wan", "mac-address": "AA:00:00:00:00:01", "address": "203.0.113.1" },
                { "interface": "bridge", "mac-address": "AA:00:00:00:00:02", "address": "192.168.88.10" },
            ]),
        );
        router.respond(
            "/interface/bridge/host",
            json!([
                { "interface": "ether2", "mac-address": "AA:00:00:00:00:02", "local": "false" },
                { "interface": "bridge", "mac-address": "CC:00:00:00:00:02", "local": "true" },
            ]),
        );
        router.respond(
            "/ip/firewall/nat",
            json!([
                { ".id": "*1", "action": "dst-nat", "protocol": "tcp", "dst-port": "443",
                  "to-addresses": "192.168.88.10", "disabled": "false" },
                { ".id": "*2", "action": "masquerade" },
            ]),
        );
        router.respond(
            "/system/resource",
            json!({ "platform": "MikroTik", "board-name": "hAP", "version": "7.14.2",
                    "uptime": "1d", "cpu-load": "3",
                    "total-memory": "1000", "free-memory": "250",
                    "total-hdd-space": "200", "free-hdd-space": "100" }),
        );
        router.respond(
            "/system/routerboard",
            json!({ "routerboard": "true", "model": "hAP ac^2", "serial-number": "ABC123",
                    "current-firmware": "7.14.2" }),
        );
        router.respond(
            "/system/package/update",
            json!({ "channel": "stable", "installed-version": "7.14.2",
                    "latest-version": "7.14.2", "status": "System is already up to date" }),
        );
        router.respond(
            "/system/script",
            json!([{ "name": "backup", "run-count": "2", "last-started": "jan/02/2024 03:00:00" }]),
        );
        router
    }

    /// Set the response for `path`. Objects are treated as one record.
    pub fn respond(&self, path: &str, value: Value) {
        let records = match value {
            Value::Array(items) => items
                .into_iter()
                .map(|v| v.as_object().unwrap().clone())
                .collect(),
            Value::Object(map) => vec![map],
            _ => Vec::new(),
        };
        self.responses.lock().unwrap().insert(path.to_owned(), records);
    }

    pub fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_owned());
    }

    pub fn recover(&self, path: &str) {
        self.failing.lock().unwrap().remove(path);
    }

    /// Never answer `path`; the poller's timeout has to fire.
    pub fn hang(&self, path: &str) {
        self.hanging.lock().unwrap().insert(path.to_owned());
    }

    pub fn unhang(&self, path: &str) {
        self.hanging.lock().unwrap().remove(path);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == path).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    async fn answer(&self, path: &str) -> Result<Vec<RawRecord>, Error> {
        self.calls.lock().unwrap().push(path.to_owned());

        let hang = self.hanging.lock().unwrap().contains(path);
        if hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        let fail = self.failing.lock().unwrap().contains(path);
        if fail {
            return Err(Error::Router {
                status: 500,
                message: format!("scripted failure for {path}"),
            });
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl RouterApi for FakeRouter {
    async fn fetch(&self, path: &str) -> Result<Vec<RawRecord>, Error> {
        self.answer(path).await
    }

    async fn fetch_traffic(&self, interfaces: &str) -> Result<Vec<RawRecord>, Error> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{TRAFFIC}?interface={interfaces}"));
        self.answer(TRAFFIC).await
    }

    async fn set_value(
        &self,
        path: &str,
        param: &str,
        value: &str,
        mod_param: &str,
        mod_value: &str,
    ) -> Result<bool, Error> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("set {path} {param}={value} where {mod_param}={mod_value}"));
        let responses = self.responses.lock().unwrap();
        Ok(responses.get(path).is_some_and(|records| {
            records
                .iter()
                .any(|r| r.get(mod_param).and_then(Value::as_str) == Some(mod_value))
        }))
    }

    async fn run_script(&self, name: &str) -> Result<bool, Error> {
        self.calls.lock().unwrap().push(format!("run {name}"));
        Ok(true)
    }
}

pub fn config() -> mikrosync_core::ControllerConfig {
    mikrosync_core::ControllerConfig::new(
        url::Url::parse("https://192.168.88.1").unwrap(),
        "admin",
        secrecy::SecretString::from(String::new()),
    )
}
