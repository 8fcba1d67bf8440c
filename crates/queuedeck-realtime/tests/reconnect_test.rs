//! Reconnection and delivery behavior of the connection manager, driven
//! through a scripted transport.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use queuedeck_core::config::realtime::RealtimeConfig;
use queuedeck_core::error::AppError;
use queuedeck_core::result::AppResult;
use queuedeck_realtime::{
    ConnectionManager, ConnectionObserver, ConnectionState, Connector, Envelope, RetryTimer,
    Transport,
};

/// Timer that never actually waits, so retry loops settle immediately.
#[derive(Debug)]
struct InstantTimer;

#[async_trait]
impl RetryTimer for InstantTimer {
    async fn sleep(&self, _duration: Duration) {
        tokio::task::yield_now().await;
    }
}

/// What the next dial should produce.
enum Dial {
    /// Dial error.
    Refuse,
    /// A transport fed by the given frame source; `None` closes it.
    Accept(mpsc::UnboundedReceiver<Option<String>>),
}

#[derive(Default)]
struct ScriptedConnector {
    script: Mutex<VecDeque<Dial>>,
    dials: AtomicUsize,
    sent: Arc<Mutex<Vec<String>>>,
}

impl std::fmt::Debug for ScriptedConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedConnector").finish()
    }
}

impl ScriptedConnector {
    fn new(script: Vec<Dial>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            dials: AtomicUsize::new(0),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn dial_count(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _endpoint: &str) -> AppResult<Box<dyn Transport>> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().await.pop_front() {
            Some(Dial::Accept(frames)) => Ok(Box::new(ScriptedTransport {
                frames,
                sent: self.sent.clone(),
            })),
            Some(Dial::Refuse) | None => Err(AppError::transport("connection refused")),
        }
    }
}

struct ScriptedTransport {
    frames: mpsc::UnboundedReceiver<Option<String>>,
    sent: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&mut self, frame: String) -> AppResult<()> {
        self.sent.lock().await.push(frame);
        Ok(())
    }

    async fn next(&mut self) -> Option<AppResult<String>> {
        match self.frames.recv().await {
            Some(Some(frame)) => Some(Ok(frame)),
            Some(None) | None => None,
        }
    }

    async fn close(&mut self) {}
}

/// A frame source whose sender side is already gone: the transport opens
/// and immediately reports a remote close.
fn instantly_closed() -> Dial {
    let (_tx, rx) = mpsc::unbounded_channel();
    Dial::Accept(rx)
}

/// A frame source delivering the given frames and then closing.
fn frames_then_close(frames: &[&str]) -> Dial {
    let (tx, rx) = mpsc::unbounded_channel();
    for frame in frames {
        tx.send(Some((*frame).to_string())).unwrap();
    }
    tx.send(None).unwrap();
    Dial::Accept(rx)
}

/// A frame source held open by the returned sender.
fn held_open() -> (mpsc::UnboundedSender<Option<String>>, Dial) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, Dial::Accept(rx))
}

#[derive(Debug, PartialEq)]
enum Event {
    Connect,
    Message(String),
    Error,
    Disconnect,
}

struct RecordingObserver {
    tx: mpsc::UnboundedSender<Event>,
}

#[async_trait]
impl ConnectionObserver for RecordingObserver {
    async fn on_connect(&self) {
        let _ = self.tx.send(Event::Connect);
    }

    async fn on_message(&self, envelope: Envelope) {
        let _ = self.tx.send(Event::Message(envelope.kind));
    }

    async fn on_error(&self, _error: &AppError) {
        let _ = self.tx.send(Event::Error);
    }

    async fn on_disconnect(&self) {
        let _ = self.tx.send(Event::Disconnect);
    }
}

fn config(max_attempts: u32) -> RealtimeConfig {
    RealtimeConfig {
        max_reconnect_attempts: max_attempts,
        reconnect_delay_ms: 1,
        backoff: false,
        reconnect_jitter_ms: 0,
        ..RealtimeConfig::default()
    }
}

fn manager(
    max_attempts: u32,
    script: Vec<Dial>,
) -> (
    ConnectionManager,
    Arc<ScriptedConnector>,
    mpsc::UnboundedReceiver<Event>,
) {
    let connector = Arc::new(ScriptedConnector::new(script));
    let (tx, rx) = mpsc::unbounded_channel();
    let manager = ConnectionManager::new(
        &config(max_attempts),
        connector.clone(),
        Arc::new(RecordingObserver { tx }),
    )
    .with_timer(Arc::new(InstantTimer));
    (manager, connector, rx)
}

async fn expect_event(rx: &mut mpsc::UnboundedReceiver<Event>) -> Event {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

async fn expect_no_event(rx: &mut mpsc::UnboundedReceiver<Event>) {
    let outcome = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(outcome.is_err(), "unexpected event: {:?}", outcome.unwrap());
}

#[tokio::test]
async fn attempt_cap_settles_permanently_closed() {
    let (manager, connector, mut events) = manager(
        3,
        vec![instantly_closed(), instantly_closed(), instantly_closed()],
    );
    manager.connect("wss://rt.example.com/ws/q1").await;

    for _ in 0..3 {
        assert_eq!(expect_event(&mut events).await, Event::Connect);
        assert_eq!(expect_event(&mut events).await, Event::Disconnect);
    }
    expect_no_event(&mut events).await;

    let handle = manager.handle().await;
    assert_eq!(handle.state, ConnectionState::Closed);
    assert_eq!(handle.attempt, 3);
    // No fourth dial was scheduled.
    assert_eq!(connector.dial_count(), 3);
}

#[tokio::test]
async fn fresh_connect_resets_a_dormant_channel() {
    let (manager, connector, mut events) = manager(1, vec![instantly_closed()]);
    manager.connect("wss://rt.example.com/ws/q1").await;
    assert_eq!(expect_event(&mut events).await, Event::Connect);
    assert_eq!(expect_event(&mut events).await, Event::Disconnect);
    expect_no_event(&mut events).await;
    assert_eq!(manager.handle().await.attempt, 1);

    // Dormant now; an explicit connect starts over from zero.
    let (keeper, dial) = held_open();
    connector.script.lock().await.push_back(dial);
    manager.connect("wss://rt.example.com/ws/q1").await;
    assert_eq!(expect_event(&mut events).await, Event::Connect);

    let handle = manager.handle().await;
    assert_eq!(handle.state, ConnectionState::Open);
    assert_eq!(handle.attempt, 0);
    assert_eq!(connector.dial_count(), 2);
    drop(keeper);
}

#[tokio::test]
async fn successful_open_resets_attempt_counter() {
    let (keeper, dial) = held_open();
    let (manager, _connector, mut events) = manager(5, vec![Dial::Refuse, Dial::Refuse, dial]);
    manager.connect("wss://rt.example.com/ws/q1").await;

    // Two refused dials, each reported as error + disconnect.
    for _ in 0..2 {
        assert_eq!(expect_event(&mut events).await, Event::Error);
        assert_eq!(expect_event(&mut events).await, Event::Disconnect);
    }
    assert_eq!(expect_event(&mut events).await, Event::Connect);

    let handle = manager.handle().await;
    assert_eq!(handle.state, ConnectionState::Open);
    assert_eq!(handle.attempt, 0);
    assert!(manager.is_connected().await);
    drop(keeper);
}

#[tokio::test]
async fn frames_are_delivered_in_transport_order() {
    let (manager, _connector, mut events) = manager(
        1,
        vec![frames_then_close(&[
            r#"{"type":"first"}"#,
            r#"{"type":"second"}"#,
            r#"{"type":"third"}"#,
        ])],
    );
    manager.connect("wss://rt.example.com/ws/q1").await;

    assert_eq!(expect_event(&mut events).await, Event::Connect);
    for kind in ["first", "second", "third"] {
        assert_eq!(
            expect_event(&mut events).await,
            Event::Message(kind.to_string())
        );
    }
    assert_eq!(expect_event(&mut events).await, Event::Disconnect);
}

#[tokio::test]
async fn malformed_frames_are_dropped_without_closing() {
    let (manager, _connector, mut events) = manager(
        1,
        vec![frames_then_close(&[
            "this is not json",
            r#"{"missing":"type"}"#,
            r#"{"type":"survivor"}"#,
        ])],
    );
    manager.connect("wss://rt.example.com/ws/q1").await;

    assert_eq!(expect_event(&mut events).await, Event::Connect);
    // The bad frames produce nothing; the good one still arrives on the
    // same connection.
    assert_eq!(
        expect_event(&mut events).await,
        Event::Message("survivor".to_string())
    );
    assert_eq!(expect_event(&mut events).await, Event::Disconnect);
}

#[tokio::test]
async fn send_while_not_open_drops_silently() {
    let (manager, connector, mut events) = manager(1, vec![]);

    // Never connected: no panic, nothing written.
    manager.send(&Envelope::new("subscribe")).await;

    let (keeper, dial) = held_open();
    connector.script.lock().await.push_back(dial);
    manager.connect("wss://rt.example.com/ws/q1").await;
    assert_eq!(expect_event(&mut events).await, Event::Connect);

    // Open: the write goes through.
    manager.send(&Envelope::new("subscribe").with("queue", "q1")).await;
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if !connector.sent.lock().await.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("outbound frame never reached the transport");

    let sent = connector.sent.lock().await.clone();
    assert_eq!(sent.len(), 1, "the pre-open send must not be delivered late");
    assert!(sent[0].contains(r#""type":"subscribe""#));
    drop(keeper);
}

#[tokio::test]
async fn connect_to_same_endpoint_is_a_no_op() {
    let (keeper, dial) = held_open();
    let (manager, connector, mut events) = manager(1, vec![dial]);
    manager.connect("wss://rt.example.com/ws/q1").await;
    assert_eq!(expect_event(&mut events).await, Event::Connect);

    manager.connect("wss://rt.example.com/ws/q1").await;
    expect_no_event(&mut events).await;
    assert_eq!(connector.dial_count(), 1);
    drop(keeper);
}

#[tokio::test]
async fn endpoint_change_tears_down_the_old_handle_first() {
    let (keeper_a, dial_a) = held_open();
    let (keeper_b, dial_b) = held_open();
    let (manager, connector, mut events) = manager(1, vec![dial_a, dial_b]);

    manager.connect("wss://rt.example.com/ws/q1").await;
    assert_eq!(expect_event(&mut events).await, Event::Connect);

    manager.connect("wss://rt.example.com/ws/q2").await;
    assert_eq!(expect_event(&mut events).await, Event::Disconnect);
    assert_eq!(expect_event(&mut events).await, Event::Connect);

    let handle = manager.handle().await;
    assert_eq!(handle.endpoint, "wss://rt.example.com/ws/q2");
    assert_eq!(handle.state, ConnectionState::Open);
    assert_eq!(connector.dial_count(), 2);
    drop(keeper_a);
    drop(keeper_b);
}

#[tokio::test]
async fn disconnect_before_any_connect_leaves_closed() {
    let (manager, connector, mut events) = manager(1, vec![]);

    manager.disconnect().await;
    assert_eq!(manager.handle().await.state, ConnectionState::Closed);
    assert_eq!(connector.dial_count(), 0);
    expect_no_event(&mut events).await;
}

#[tokio::test]
async fn disconnect_is_idempotent_and_cancels_retries() {
    let (keeper, dial) = held_open();
    let (manager, connector, mut events) = manager(10, vec![dial]);
    manager.connect("wss://rt.example.com/ws/q1").await;
    assert_eq!(expect_event(&mut events).await, Event::Connect);

    manager.disconnect().await;
    assert_eq!(expect_event(&mut events).await, Event::Disconnect);
    assert_eq!(manager.handle().await.state, ConnectionState::Closed);

    // No automatic reconnect after a local disconnect.
    expect_no_event(&mut events).await;
    assert_eq!(connector.dial_count(), 1);

    manager.disconnect().await;
    assert_eq!(manager.handle().await.state, ConnectionState::Closed);
    drop(keeper);
}
