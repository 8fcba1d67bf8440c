//! Resilient connection manager.
//!
//! Owns one logical real-time channel at a time: dials the endpoint,
//! tracks handle state, retries with bounded backoff on failure, and
//! fans parsed envelopes out to the single registered observer in
//! transport order. Messages lost while disconnected are gone; there are
//! no resume or replay semantics.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use queuedeck_core::config::realtime::RealtimeConfig;
use queuedeck_core::error::AppError;

use crate::message::Envelope;

use super::handle::{ConnectionHandle, ConnectionState};
use super::policy::ReconnectPolicy;
use super::timer::{RetryTimer, TokioTimer};
use super::transport::{Connector, Transport, WsConnector};

/// Callbacks delivered to the one consumer owning this channel.
///
/// All callbacks run on the manager's driver task; a slow callback
/// backpressures frame delivery rather than reordering it.
#[async_trait]
pub trait ConnectionObserver: Send + Sync + 'static {
    /// The transport opened (or reopened).
    async fn on_connect(&self) {}

    /// One inbound envelope, in transport order.
    async fn on_message(&self, envelope: Envelope);

    /// A transport error. State changes are driven by the close that
    /// follows, never by the error itself.
    async fn on_error(&self, _error: &AppError) {}

    /// The transport closed.
    async fn on_disconnect(&self) {}
}

struct Shared {
    handle: Mutex<ConnectionHandle>,
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
    cancel: Mutex<Option<CancellationToken>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Maintains exactly one live transport connection for its consumer,
/// with automatic recovery up to the configured attempt cap.
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    observer: Arc<dyn ConnectionObserver>,
    policy: ReconnectPolicy,
    timer: Arc<dyn RetryTimer>,
    connect_timeout: Duration,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("policy", &self.policy)
            .finish()
    }
}

impl ConnectionManager {
    /// Creates a manager with a custom connector (tests inject a scripted
    /// one here).
    pub fn new(
        config: &RealtimeConfig,
        connector: Arc<dyn Connector>,
        observer: Arc<dyn ConnectionObserver>,
    ) -> Self {
        Self {
            connector,
            observer,
            policy: ReconnectPolicy::from_config(config),
            timer: Arc::new(TokioTimer),
            connect_timeout: Duration::from_secs(config.connect_timeout_seconds),
            shared: Arc::new(Shared {
                handle: Mutex::new(ConnectionHandle::idle("")),
                outbound: Mutex::new(None),
                cancel: Mutex::new(None),
                task: Mutex::new(None),
            }),
        }
    }

    /// Creates a manager dialing real WebSockets.
    pub fn websocket(config: &RealtimeConfig, observer: Arc<dyn ConnectionObserver>) -> Self {
        Self::new(config, Arc::new(WsConnector), observer)
    }

    /// Replaces the reconnect timer. Tests use this to collapse waits.
    pub fn with_timer(mut self, timer: Arc<dyn RetryTimer>) -> Self {
        self.timer = timer;
        self
    }

    /// Opens the channel to `endpoint`.
    ///
    /// A no-op when a connection to the same endpoint is already open or
    /// connecting. Any other existing handle is torn down first; at most
    /// one handle is ever live. Calling this on a dormant manager resets
    /// the attempt counter and dials again.
    pub async fn connect(&self, endpoint: &str) {
        {
            let handle = self.shared.handle.lock().await;
            if handle.endpoint == endpoint
                && matches!(
                    handle.state,
                    ConnectionState::Open | ConnectionState::Connecting
                )
            {
                debug!(endpoint = %endpoint, state = %handle.state, "connect is a no-op");
                return;
            }
        }

        self.teardown().await;

        {
            let mut handle = self.shared.handle.lock().await;
            *handle = ConnectionHandle::idle(endpoint);
            handle.state = ConnectionState::Connecting;
        }

        let cancel = CancellationToken::new();
        *self.shared.cancel.lock().await = Some(cancel.clone());
        let task = tokio::spawn(run_loop(
            self.shared.clone(),
            self.connector.clone(),
            self.observer.clone(),
            self.policy.clone(),
            self.timer.clone(),
            self.connect_timeout,
            endpoint.to_string(),
            cancel,
        ));
        *self.shared.task.lock().await = Some(task);
    }

    /// Cancels any pending reconnect and closes the transport. Always
    /// legal, idempotent, leaves the handle `closed`.
    pub async fn disconnect(&self) {
        self.teardown().await;
        self.shared.handle.lock().await.state = ConnectionState::Closed;
    }

    /// Serializes and writes a message if the channel is open; otherwise
    /// the message is dropped with a warning. Never queued, never
    /// retried.
    pub async fn send(&self, message: &Envelope) {
        let state = self.shared.handle.lock().await.state;
        if state != ConnectionState::Open {
            warn!(kind = %message.kind, state = %state, "Dropping outbound message; channel not open");
            return;
        }
        let frame = match message.to_json() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(kind = %message.kind, error = %e, "Dropping unserializable outbound message");
                return;
            }
        };
        let outbound = self.shared.outbound.lock().await;
        match outbound.as_ref() {
            Some(tx) => {
                if tx.send(frame).is_err() {
                    warn!(kind = %message.kind, "Channel closing; outbound message dropped");
                }
            }
            None => {
                warn!(kind = %message.kind, "Channel closing; outbound message dropped");
            }
        }
    }

    /// Snapshot of the current handle.
    pub async fn handle(&self) -> ConnectionHandle {
        self.shared.handle.lock().await.clone()
    }

    /// Whether the transport is currently open.
    pub async fn is_connected(&self) -> bool {
        self.shared.handle.lock().await.state == ConnectionState::Open
    }

    async fn teardown(&self) {
        if let Some(cancel) = self.shared.cancel.lock().await.take() {
            cancel.cancel();
        }
        if let Some(task) = self.shared.task.lock().await.take() {
            let _ = task.await;
        }
        self.shared.outbound.lock().await.take();
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        // The driver task holds only Arcs; cancelling here lets it wind
        // down even if the consumer never called disconnect.
        if let Some(cancel) = self.shared.cancel.try_lock().ok().and_then(|mut c| c.take()) {
            cancel.cancel();
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_loop(
    shared: Arc<Shared>,
    connector: Arc<dyn Connector>,
    observer: Arc<dyn ConnectionObserver>,
    policy: ReconnectPolicy,
    timer: Arc<dyn RetryTimer>,
    connect_timeout: Duration,
    endpoint: String,
    cancel: CancellationToken,
) {
    loop {
        shared.handle.lock().await.state = ConnectionState::Connecting;

        let dial = tokio::select! {
            _ = cancel.cancelled() => {
                shared.handle.lock().await.state = ConnectionState::Closed;
                return;
            }
            dial = tokio::time::timeout(connect_timeout, connector.connect(&endpoint)) => dial,
        };

        match dial {
            Ok(Ok(transport)) => {
                {
                    let mut handle = shared.handle.lock().await;
                    handle.state = ConnectionState::Open;
                    handle.attempt = 0;
                    handle.last_error = None;
                }
                let (tx, rx) = mpsc::unbounded_channel();
                *shared.outbound.lock().await = Some(tx);
                info!(endpoint = %endpoint, "Real-time channel open");
                observer.on_connect().await;

                let finished = drive_open(&shared, &observer, transport, rx, &cancel).await;

                shared.outbound.lock().await.take();
                shared.handle.lock().await.state = ConnectionState::Closed;
                observer.on_disconnect().await;
                if finished == Finished::Cancelled {
                    return;
                }
            }
            Ok(Err(e)) => {
                warn!(endpoint = %endpoint, error = %e, "Real-time dial failed");
                observer.on_error(&e).await;
                {
                    let mut handle = shared.handle.lock().await;
                    handle.state = ConnectionState::Closed;
                    handle.last_error = Some(e.to_string());
                }
                observer.on_disconnect().await;
            }
            Err(_elapsed) => {
                let e = AppError::transport(format!(
                    "Dial timed out after {connect_timeout:?}"
                ));
                warn!(endpoint = %endpoint, error = %e, "Real-time dial timed out");
                observer.on_error(&e).await;
                {
                    let mut handle = shared.handle.lock().await;
                    handle.state = ConnectionState::Closed;
                    handle.last_error = Some(e.to_string());
                }
                observer.on_disconnect().await;
            }
        }

        // Retry bookkeeping: increment, then go dormant once the counter
        // reaches the cap. The consumer can call `connect` again to start
        // over from zero.
        let attempt = {
            let mut handle = shared.handle.lock().await;
            handle.attempt += 1;
            handle.attempt
        };
        if attempt >= policy.max_attempts {
            info!(
                endpoint = %endpoint,
                attempts = attempt,
                "Reconnect attempts exhausted; channel dormant"
            );
            return;
        }

        let delay = policy.delay_for(attempt);
        debug!(endpoint = %endpoint, attempt, ?delay, "Scheduling reconnect");
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = timer.sleep(delay) => {}
        }
    }
}

#[derive(PartialEq, Eq)]
enum Finished {
    /// Remote close or transport error; retry applies.
    Remote,
    /// Local `disconnect`; no retry.
    Cancelled,
}

/// Drives one open transport until it closes, errors, or is cancelled.
async fn drive_open(
    shared: &Arc<Shared>,
    observer: &Arc<dyn ConnectionObserver>,
    mut transport: Box<dyn Transport>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    cancel: &CancellationToken,
) -> Finished {
    let mut outbound_open = true;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                shared.handle.lock().await.state = ConnectionState::Closing;
                transport.close().await;
                return Finished::Cancelled;
            }
            frame = transport.next() => match frame {
                Some(Ok(text)) => match Envelope::parse(&text) {
                    Ok(envelope) => observer.on_message(envelope).await,
                    // Malformed frames are dropped, never fatal.
                    Err(e) => warn!(error = %e, "Dropping malformed inbound frame"),
                },
                Some(Err(e)) => {
                    warn!(error = %e, "Real-time transport error");
                    observer.on_error(&e).await;
                    shared.handle.lock().await.last_error = Some(e.to_string());
                    return Finished::Remote;
                }
                None => {
                    debug!("Real-time transport closed by remote");
                    return Finished::Remote;
                }
            },
            message = outbound.recv(), if outbound_open => {
                match message {
                    Some(frame) => {
                        if let Err(e) = transport.send(frame).await {
                            warn!(error = %e, "Real-time write failed");
                            observer.on_error(&e).await;
                            shared.handle.lock().await.last_error = Some(e.to_string());
                            return Finished::Remote;
                        }
                    }
                    None => outbound_open = false,
                }
            }
        }
    }
}
