#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use mikrosync_core::{ConnectionState, DataStore, FieldValue, PollOptions, Poller};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{FakeRouter, TRAFFIC};

fn poller(router: &Arc<FakeRouter>, track_arp: bool) -> (Poller, Arc<DataStore>) {
    let store = Arc::new(DataStore::new());
    let options = PollOptions {
        track_arp,
        bridge_interface: "bridge".into(),
        timeout: Duration::from_secs(5),
    };
    let api: Arc<dyn mikrosync_api::RouterApi> = router.clone();
    (Poller::new(api, Arc::clone(&store), options), store)
}

#[tokio::test]
async fn first_update_fills_every_table() {
    let router = FakeRouter::home();
    let (mut poller, store) = poller(&router, true);
    let mut listener = store.subscribe();

    poller.update().await;

    let data = store.snapshot();
    assert_eq!(data.interfaces.len(), 2);

    let wan = &data.interfaces["ether1"];
    assert_eq!(wan["name"], FieldValue::from("wan"));
    assert_eq!(wan["rx-bits-per-second"], FieldValue::Int(4000));
    assert_eq!(wan["client-mac-address"], FieldValue::from("AA:00:00:00:00:01"));
    assert_eq!(wan["client-ip-address"], FieldValue::from("203.0.113.1"));

    let lan = &data.interfaces["ether2"];
    assert_eq!(lan["client-mac-address"], FieldValue::from("AA:00:00:00:00:02"));
    assert_eq!(lan["client-ip-address"], FieldValue::from("192.168.88.10"));

    assert_eq!(data.nat.len(), 1);
    assert_eq!(data.nat["*1"]["name"], FieldValue::from("tcp:443"));
    assert_eq!(data.resource["memory-usage"], FieldValue::Int(75));
    assert_eq!(data.resource["hdd-usage"], FieldValue::Int(50));
    assert_eq!(data.routerboard["model"], FieldValue::from("hAP ac^2"));
    assert_eq!(data.firmware["available"], FieldValue::Bool(false));
    assert_eq!(data.scripts["backup"]["run-count"], FieldValue::from("2"));

    assert!(listener.changed().await);
    assert_eq!(store.generation(), 1);
    assert_eq!(store.connection_state(), ConnectionState::Connected);
}

#[tokio::test]
async fn steps_run_in_order() {
    let router = FakeRouter::home();
    let (mut poller, _store) = poller(&router, true);

    poller.update().await;

    assert_eq!(
        router.calls(),
        vec![
            "/system/package/update",
            "/system/routerboard",
            "/interface",
            "/interface/monitor-traffic?interface=wan,ether2",
            TRAFFIC,
            "/ip/arp",
            "/interface/bridge/host",
            "/ip/firewall/nat",
            "/system/resource",
            "/system/script",
        ]
    );
}

#[tokio::test]
async fn bootstrap_steps_only_run_once() {
    let router = FakeRouter::home();
    let (mut poller, _store) = poller(&router, true);

    poller.update().await;
    router.clear_calls();
    poller.update().await;

    assert_eq!(router.call_count("/system/package/update"), 0);
    assert_eq!(router.call_count("/system/routerboard"), 0);
    assert_eq!(router.call_count("/interface"), 1);
}

#[tokio::test]
async fn traffic_query_follows_renames_in_same_cycle() {
    let router = FakeRouter::home();
    let (mut poller, store) = poller(&router, true);
    poller.update().await;

    router.respond(
        "/interface",
        json!([
            { "default-name": "ether1", "name": "uplink", "type": "ether" },
            { "default-name": "ether2", "name": "ether2", "type": "ether" },
        ]),
    );
    router.respond(
        TRAFFIC,
        json!([{ "name": "uplink", "rx-bits-per-second": "9000" }]),
    );
    router.clear_calls();
    poller.update().await;

    assert!(
        router
            .calls()
            .contains(&"/interface/monitor-traffic?interface=uplink,ether2".to_owned())
    );
    assert_eq!(
        store.snapshot().interfaces["ether1"]["rx-bits-per-second"],
        FieldValue::Int(9000)
    );
}

#[tokio::test]
async fn no_traffic_request_without_interfaces() {
    let router = FakeRouter::new();
    let (mut poller, _store) = poller(&router, true);

    poller.update().await;

    assert_eq!(router.call_count(TRAFFIC), 0);
    assert!(router.calls().iter().all(|c| !c.starts_with(TRAFFIC)));
}

#[tokio::test]
async fn tracking_disabled_skips_arp_and_bridge() {
    let router = FakeRouter::home();
    let (mut poller, store) = poller(&router, false);

    poller.update().await;

    assert_eq!(router.call_count("/ip/arp"), 0);
    assert_eq!(router.call_count("/interface/bridge/host"), 0);

    let data = store.snapshot();
    for iface in data.interfaces.values() {
        assert_eq!(iface["client-ip-address"], FieldValue::Disabled);
        assert_eq!(iface["client-mac-address"], FieldValue::Disabled);
    }
    assert!(data.arp.is_empty());
}

#[tokio::test]
async fn bridge_hosts_not_fetched_when_bridge_unused() {
    let router = FakeRouter::home();
    router.respond(
        "/ip/arp",
        json!([{ "interface": "wan", "mac-address": "AA:00:00:00:00:01", "address": "203.0.113.1" }]),
    );
    let (mut poller, _store) = poller(&router, true);

    poller.update().await;

    assert_eq!(router.call_count("/interface/bridge/host"), 0);
}

#[tokio::test]
async fn failed_step_keeps_previous_data() {
    let router = FakeRouter::home();
    let (mut poller, store) = poller(&router, true);
    poller.update().await;
    let before = store.snapshot();

    router.fail("/ip/firewall/nat");
    router.respond("/system/resource", json!({ "total-memory": "1000", "free-memory": "900" }));
    poller.update().await;

    let after = store.snapshot();
    assert_eq!(after.nat, before.nat);
    assert_eq!(after.resource["memory-usage"], FieldValue::Int(10));
    assert_eq!(store.generation(), 2);
    assert!(poller.take_failure().is_none());
}

#[tokio::test]
async fn unreachable_router_marks_disconnected() {
    let router = FakeRouter::home();
    for path in [
        "/system/package/update",
        "/system/routerboard",
        "/interface",
        "/ip/arp",
        "/ip/firewall/nat",
        "/system/resource",
        "/system/script",
    ] {
        router.fail(path);
    }
    let (mut poller, store) = poller(&router, true);

    poller.update().await;

    assert!(matches!(
        store.connection_state(),
        ConnectionState::Unreachable { .. }
    ));
    assert!(poller.take_failure().is_some());
    assert!(store.snapshot().interfaces.is_empty());
    // The cycle still completes and notifies.
    assert_eq!(store.generation(), 1);

    router.recover("/interface");
    poller.update().await;
    // Interfaces and traffic reset the counter; the four later steps fail again.
    assert_eq!(store.connection_state(), ConnectionState::Unreachable { failures: 4 });
    assert_eq!(store.snapshot().interfaces.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn hanging_fetch_times_out() {
    let router = FakeRouter::home();
    router.hang("/system/script");
    let (mut poller, store) = poller(&router, true);

    poller.update().await;

    let data = store.snapshot();
    assert!(data.scripts.is_empty());
    assert_eq!(data.interfaces.len(), 2);
    assert_eq!(store.connection_state(), ConnectionState::Unreachable { failures: 1 });
}

#[tokio::test]
async fn firmware_check_is_sticky() {
    let router = FakeRouter::home();
    router.respond(
        "/system/package/update",
        json!({ "channel": "stable", "status": "New version is available", "latest-version": "7.15" }),
    );
    let (mut poller, store) = poller(&router, true);

    poller.firmware_check().await;
    assert!(store.snapshot().firmware_update_available());

    router.respond("/system/package/update", json!({ "channel": "stable" }));
    poller.firmware_check().await;
    assert!(store.snapshot().firmware_update_available());
    assert_eq!(store.generation(), 2);
}

#[tokio::test]
async fn hwinfo_update_refreshes_routerboard_and_resource() {
    let router = FakeRouter::home();
    let (mut poller, store) = poller(&router, true);

    poller.hwinfo_update().await;

    assert_eq!(router.calls(), vec!["/system/routerboard", "/system/resource"]);
    assert_eq!(store.snapshot().routerboard["serial-number"], FieldValue::from("ABC123"));
}

#[tokio::test]
async fn empty_script_names_are_not_stored() {
    let router = FakeRouter::home();
    router.respond(
        "/system/script",
        json!([{ "name": "" }, { "name": "reboot", "run-count": "0" }]),
    );
    let (mut poller, store) = poller(&router, true);

    poller.update().await;

    let scripts = &store.snapshot().scripts;
    assert_eq!(scripts.keys().collect::<Vec<_>>(), vec!["reboot"]);
}
