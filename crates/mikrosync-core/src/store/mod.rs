// ── Snapshot store and change signal ──
//
// Holds the latest published `RouterData` and the payload-free change
// signal. Only the poll worker writes; any number of readers clone the
// current `Arc` snapshot or wait on the signal.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use crate::model::RouterData;
use crate::stream::UpdateListener;

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// The last fetch failed. Cleared by the next successful fetch.
    Unreachable { failures: u32 },
}

pub struct DataStore {
    data: watch::Sender<Arc<RouterData>>,
    /// Swapped out wholesale on `reset`, which closes every listener
    /// subscribed to the previous sender.
    signal: ArcSwap<watch::Sender<u64>>,
    last_update: watch::Sender<Option<DateTime<Utc>>>,
    connection: watch::Sender<ConnectionState>,
}

impl DataStore {
    pub fn new() -> Self {
        let (data, _) = watch::channel(Arc::new(RouterData::default()));
        let (signal, _) = watch::channel(0);
        let (last_update, _) = watch::channel(None);
        let (connection, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            data,
            signal: ArcSwap::from_pointee(signal),
            last_update,
            connection,
        }
    }

    // ── Snapshots ────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<RouterData> {
        self.data.borrow().clone()
    }

    /// Watch full snapshots rather than the bare signal.
    pub fn subscribe_data(&self) -> watch::Receiver<Arc<RouterData>> {
        self.data.subscribe()
    }

    /// Replace the published snapshot. Does not fire the change signal.
    pub fn publish(&self, data: RouterData) {
        self.data.send_replace(Arc::new(data));
        self.last_update.send_replace(Some(Utc::now()));
    }

    // ── Change signal ────────────────────────────────────────────────

    /// Wake every listener once.
    pub fn notify(&self) {
        let signal = self.signal.load();
        signal.send_modify(|generation| *generation = generation.wrapping_add(1));
        debug!(listeners = signal.receiver_count(), "change signal fired");
    }

    pub fn subscribe(&self) -> UpdateListener {
        UpdateListener::new(self.signal.load().subscribe())
    }

    /// Detach every current listener. Their `changed()` resolves to
    /// `false`; listeners subscribed afterwards are unaffected.
    pub fn reset(&self) -> bool {
        let (fresh, _) = watch::channel(self.generation());
        let previous = self.signal.swap(Arc::new(fresh));
        debug!(detached = previous.receiver_count(), "change listeners reset");
        true
    }

    /// Number of notifications fired so far.
    pub fn generation(&self) -> u64 {
        *self.signal.load().borrow()
    }

    pub fn listener_count(&self) -> usize {
        self.signal.load().receiver_count()
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *self.last_update.borrow()
    }

    /// How long ago the last snapshot was published, or `None` if never.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_update().map(|t| Utc::now() - t)
    }

    // ── Connection state ─────────────────────────────────────────────

    pub fn connection_state(&self) -> ConnectionState {
        *self.connection.borrow()
    }

    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.connection.subscribe()
    }

    pub fn set_connection(&self, state: ConnectionState) {
        self.connection.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }

    /// Record one failed fetch.
    pub fn mark_unreachable(&self) {
        self.connection.send_modify(|current| {
            *current = match *current {
                ConnectionState::Unreachable { failures } => ConnectionState::Unreachable {
                    failures: failures.saturating_add(1),
                },
                _ => ConnectionState::Unreachable { failures: 1 },
            };
        });
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
