// ── Controller abstraction ──
//
// Lifecycle management for one polled router. A single worker task owns
// the `Poller`; interval tasks only enqueue `PollRequest`s, so cycles run
// strictly one after another. Consumers read `Arc<RouterData>` snapshots
// and wait on the payload-free change signal.

use std::sync::Arc;
use std::time::Duration;

use mikrosync_api::{RestClient, RouterApi};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{Record, RouterData, Table};
use crate::poller::{PollOptions, Poller};
use crate::store::{ConnectionState, DataStore};
use crate::stream::UpdateListener;

const REQUEST_CHANNEL_SIZE: usize = 8;
/// One pending tick per cadence; further ticks are dropped until the
/// worker takes it.
const TICK_CHANNEL_SIZE: usize = 1;

// ── Poll requests ────────────────────────────────────────────────

/// Work the poll worker can be asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollRequest {
    /// Fast cycle.
    Update,
    /// Slow cycle.
    FirmwareCheck,
    HwInfo,
}

struct PollEnvelope {
    request: PollRequest,
    done: Option<oneshot::Sender<()>>,
}

/// Receiving ends of one session's queues, owned by the worker.
struct WorkQueues {
    requests: mpsc::Receiver<PollEnvelope>,
    fast: mpsc::Receiver<PollRequest>,
    slow: mpsc::Receiver<PollRequest>,
}

/// Live while connected.
struct Session {
    cancel: CancellationToken,
    requests: mpsc::Sender<PollEnvelope>,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    api: Arc<dyn RouterApi>,
    store: Arc<DataStore>,
    /// Parked here between sessions; moved into the worker on connect.
    poller: Mutex<Option<Poller>>,
    cancel: CancellationToken,
    session: Mutex<Option<Session>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a controller talking REST to `config.url`. Does NOT
    /// connect; call [`connect()`](Self::connect) to start polling.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        let client = RestClient::new(
            config.url.clone(),
            config.username.clone(),
            config.password.clone(),
            &config.transport(),
        )?;
        Ok(Self::with_api(config, Arc::new(client)))
    }

    /// Create a controller over any `RouterApi` implementation.
    pub fn with_api(config: ControllerConfig, api: Arc<dyn RouterApi>) -> Self {
        let store = Arc::new(DataStore::new());
        let poller = Poller::new(
            Arc::clone(&api),
            Arc::clone(&store),
            PollOptions::from(&config),
        );
        Self {
            inner: Arc::new(ControllerInner {
                config,
                api,
                store,
                poller: Mutex::new(Some(poller)),
                cancel: CancellationToken::new(),
                session: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    /// Name of the change signal, unique per router.
    pub fn signal_name(&self) -> String {
        format!("mikrosync-update-{}", self.inner.config.name)
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Run one fast cycle inline, then start the worker and schedules.
    ///
    /// Fails only when that first cycle could not reach the router at
    /// all; later failures are logged and retried.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let mut session = self.inner.session.lock().await;
        if session.is_some() {
            return Ok(());
        }

        self.inner.store.set_connection(ConnectionState::Connecting);

        let mut poller_slot = self.inner.poller.lock().await;
        let mut poller = poller_slot
            .take()
            .ok_or_else(|| CoreError::Internal("poller is not parked".into()))?;

        poller.update().await;
        if let Some(err) = poller.take_failure() {
            *poller_slot = Some(poller);
            self.inner.store.set_connection(ConnectionState::Disconnected);
            return Err(err);
        }
        drop(poller_slot);

        let (request_tx, requests) = mpsc::channel(REQUEST_CHANNEL_SIZE);
        let (fast_tx, fast) = mpsc::channel(TICK_CHANNEL_SIZE);
        let (slow_tx, slow) = mpsc::channel(TICK_CHANNEL_SIZE);

        let token = self.inner.cancel.child_token();
        let config = &self.inner.config;
        let mut handles = self.inner.task_handles.lock().await;

        handles.push(tokio::spawn(poll_worker(
            self.clone(),
            poller,
            WorkQueues {
                requests,
                fast,
                slow,
            },
            token.clone(),
        )));
        handles.push(tokio::spawn(schedule_task(
            fast_tx,
            PollRequest::Update,
            config.scan_interval,
            token.clone(),
        )));
        handles.push(tokio::spawn(schedule_task(
            slow_tx,
            PollRequest::FirmwareCheck,
            config.firmware_interval,
            token.clone(),
        )));

        *session = Some(Session {
            cancel: token,
            requests: request_tx,
        });
        info!(router = %config.name, url = %config.url, "connected to router");
        Ok(())
    }

    /// Stop polling. A cycle already running finishes first; requests
    /// still queued behind it fail with `ControllerDisconnected`.
    pub async fn disconnect(&self) {
        let Some(session) = self.inner.session.lock().await.take() else {
            return;
        };
        session.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "background task ended abnormally");
            }
        }

        self.inner.store.set_connection(ConnectionState::Disconnected);
        info!(router = %self.inner.config.name, "disconnected");
    }

    /// One-shot: connect, run closure, disconnect.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let controller = Controller::new(config)?;
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    // ── On-demand cycles ─────────────────────────────────────────

    /// Run a fast cycle now and wait for it.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        self.request(PollRequest::Update).await
    }

    /// Run a firmware check now and wait for it.
    pub async fn check_firmware(&self) -> Result<(), CoreError> {
        self.request(PollRequest::FirmwareCheck).await
    }

    /// Re-read routerboard identity and resource usage.
    pub async fn hwinfo_update(&self) -> Result<(), CoreError> {
        self.request(PollRequest::HwInfo).await
    }

    async fn request(&self, request: PollRequest) -> Result<(), CoreError> {
        let requests = match self.inner.session.lock().await.as_ref() {
            Some(session) => session.requests.clone(),
            None => return Err(CoreError::ControllerDisconnected),
        };

        let (tx, rx) = oneshot::channel();
        requests
            .send(PollEnvelope {
                request,
                done: Some(tx),
            })
            .await
            .map_err(|_| CoreError::ControllerDisconnected)?;

        rx.await.map_err(|_| CoreError::ControllerDisconnected)
    }

    // ── Write path ───────────────────────────────────────────────

    /// Set `param = value` on the entry of `path` whose `mod_param`
    /// equals `mod_value`. `false` when no entry matched.
    pub async fn set_value(
        &self,
        path: &str,
        param: &str,
        value: &str,
        mod_param: &str,
        mod_value: &str,
    ) -> Result<bool, CoreError> {
        let timeout = self.inner.config.timeout;
        let call = self
            .inner
            .api
            .set_value(path, param, value, mod_param, mod_value);
        let changed = tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| CoreError::Timeout {
                timeout_secs: timeout.as_secs(),
            })??;
        debug!(path, param, mod_param, mod_value, changed, "set value");
        Ok(changed)
    }

    pub async fn run_script(&self, name: &str) -> Result<bool, CoreError> {
        let timeout = self.inner.config.timeout;
        let ran = tokio::time::timeout(timeout, self.inner.api.run_script(name))
            .await
            .map_err(|_| CoreError::Timeout {
                timeout_secs: timeout.as_secs(),
            })??;
        debug!(script = name, ran, "run script");
        Ok(ran)
    }

    // ── Subscriptions ────────────────────────────────────────────

    /// Subscribe to the change signal.
    pub fn subscribe(&self) -> UpdateListener {
        self.inner.store.subscribe()
    }

    /// Detach every current subscriber. Always `true`.
    pub fn reset(&self) -> bool {
        self.inner.store.reset()
    }

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.store.watch_connection()
    }

    /// Whether the last fetch reached the router.
    pub fn is_connected(&self) -> bool {
        self.inner.store.connection_state() == ConnectionState::Connected
    }

    // ── Snapshot accessors (delegate to DataStore) ───────────────

    pub fn snapshot(&self) -> Arc<RouterData> {
        self.inner.store.snapshot()
    }

    pub fn interfaces(&self) -> Table {
        self.snapshot().interfaces.clone()
    }

    pub fn nat_rules(&self) -> Table {
        self.snapshot().nat.clone()
    }

    pub fn scripts(&self) -> Table {
        self.snapshot().scripts.clone()
    }

    pub fn resource(&self) -> Record {
        self.snapshot().resource.clone()
    }

    pub fn firmware(&self) -> Record {
        self.snapshot().firmware.clone()
    }

    pub fn routerboard(&self) -> Record {
        self.snapshot().routerboard.clone()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Sole owner of the poller while connected. Hands it back on exit so a
/// later `connect` can resume with the same tables.
async fn poll_worker(
    controller: Controller,
    mut poller: Poller,
    mut queues: WorkQueues,
    cancel: CancellationToken,
) {
    loop {
        let (request, done) = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = queues.requests.recv() => match envelope {
                Some(envelope) => (envelope.request, envelope.done),
                None => break,
            },
            Some(request) = queues.slow.recv() => (request, None),
            Some(request) = queues.fast.recv() => (request, None),
        };

        debug!(?request, "running poll request");
        match request {
            PollRequest::Update => poller.update().await,
            PollRequest::FirmwareCheck => poller.firmware_check().await,
            PollRequest::HwInfo => poller.hwinfo_update().await,
        }
        if let Some(done) = done {
            let _ = done.send(());
        }
    }

    // Refuse new requests, then drop the queued ones so their callers
    // see the closed reply channel.
    queues.requests.close();
    let mut dropped = 0_usize;
    while queues.requests.try_recv().is_ok() {
        dropped += 1;
    }
    if dropped > 0 {
        debug!(dropped, "discarded queued poll requests");
    }

    *controller.inner.poller.lock().await = Some(poller);
}

/// Enqueue `request` every `period`. A tick that finds the previous one
/// still pending is dropped rather than stacked.
async fn schedule_task(
    tx: mpsc::Sender<PollRequest>,
    request: PollRequest,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match tx.try_send(request) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        debug!(?request, "previous tick still pending, skipping");
                    }
                    Err(TrySendError::Closed(_)) => break,
                }
            }
        }
    }
}
