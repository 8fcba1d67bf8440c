//! Transport abstraction and the WebSocket implementation.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use queuedeck_core::error::{AppError, ErrorKind};
use queuedeck_core::result::AppResult;

/// One live bidirectional transport carrying text frames.
#[async_trait]
pub trait Transport: Send {
    /// Writes one outbound frame.
    async fn send(&mut self, frame: String) -> AppResult<()>;

    /// Waits for the next inbound frame. `None` means the remote closed
    /// the transport; `Some(Err(_))` is a transport error.
    async fn next(&mut self) -> Option<AppResult<String>>;

    /// Closes the transport. Best effort; errors are ignored.
    async fn close(&mut self);
}

/// Dials transports for a manager.
#[async_trait]
pub trait Connector: Send + Sync + std::fmt::Debug + 'static {
    /// Opens a transport to the given endpoint.
    async fn connect(&self, endpoint: &str) -> AppResult<Box<dyn Transport>>;
}

/// WebSocket connector backed by `tokio-tungstenite`.
#[derive(Debug, Default, Clone)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, endpoint: &str) -> AppResult<Box<dyn Transport>> {
        let (ws, _response) = connect_async(endpoint).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Transport,
                format!("WebSocket dial to '{endpoint}' failed: {e}"),
                e,
            )
        })?;
        Ok(Box::new(WsTransport { ws }))
    }
}

/// A live WebSocket transport.
struct WsTransport {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, frame: String) -> AppResult<()> {
        self.ws.send(Message::Text(frame.into())).await.map_err(|e| {
            AppError::with_source(ErrorKind::Transport, format!("WebSocket send failed: {e}"), e)
        })
    }

    async fn next(&mut self) -> Option<AppResult<String>> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => return Some(Ok(text.to_string())),
                Some(Ok(Message::Ping(data))) => {
                    // Keepalive; answered inline so the server sees us as
                    // live even while the consumer is idle.
                    if self.ws.send(Message::Pong(data)).await.is_err() {
                        return None;
                    }
                }
                Some(Ok(Message::Binary(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                Some(Ok(Message::Close(_))) => return None,
                Some(Err(e)) => {
                    return Some(Err(AppError::with_source(
                        ErrorKind::Transport,
                        format!("WebSocket read failed: {e}"),
                        e,
                    )));
                }
                None => return None,
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.ws.close(None).await;
    }
}
