//! # Control-Link Relay
//!
//! WebSocket endpoint standing in for the robot's control link. Every
//! client receives one greeting on connect; inbound text is logged and
//! numeric step signals in the relay range are recognised.
//!
//! | Path | Description |
//! |------|-------------|
//! | `/` | WebSocket for control messages |
//!
//! With `relay.forward_messages` enabled, each inbound message is also
//! fanned out to every other connected client.

mod error;

pub use error::{RelayError, Result};

use axum::{
    extract::{
        ws::{Message, WebSocket},
        ConnectInfo, State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
    Router,
};
use dancebot_core::{relay_step_signal, RelayConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Capacity of the forwarding channel
const FORWARD_CAPACITY: usize = 100;

/// A message received from one client, to be sent to the others
#[derive(Debug, Clone)]
struct Forwarded {
    from: SocketAddr,
    text: String,
}

/// Shared state passed to all connections
#[derive(Clone)]
struct RelayState {
    greeting: String,
    forward_tx: Option<broadcast::Sender<Forwarded>>,
    cancel_token: CancellationToken,
}

/// What an inbound frame means to the relay
#[derive(Debug, PartialEq, Eq)]
enum Inbound {
    Text(String),
    Ignored,
    Closed,
}

impl Inbound {
    fn from_frame(frame: Option<std::result::Result<Message, axum::Error>>) -> Self {
        match frame {
            Some(Ok(Message::Text(text))) => Self::Text(text.as_str().to_owned()),
            Some(Ok(Message::Binary(bytes))) => {
                Self::Text(String::from_utf8_lossy(&bytes).into_owned())
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => Self::Ignored,
            Some(Ok(Message::Close(_))) | None => Self::Closed,
            Some(Err(e)) => {
                debug!("WebSocket error: {}", e);
                Self::Closed
            }
        }
    }
}

/// Build the relay router.
///
/// Open connections end when `cancel_token` is cancelled.
#[must_use]
pub fn router(config: &RelayConfig, cancel_token: CancellationToken) -> Router {
    let forward_tx = config
        .forward_messages
        .then(|| broadcast::channel(FORWARD_CAPACITY).0);

    let state = RelayState {
        greeting: config.greeting.clone(),
        forward_tx,
        cancel_token,
    };

    Router::new()
        .route("/", get(handle_websocket))
        .with_state(state)
}

/// Bind the relay's listening socket.
///
/// # Errors
///
/// Returns [`RelayError::Bind`] if the address is invalid or in use.
pub async fn bind(config: &RelayConfig) -> Result<TcpListener> {
    let address = format!("{}:{}", config.bind_address, config.port);
    TcpListener::bind(&address)
        .await
        .map_err(|source| RelayError::Bind { address, source })
}

/// Serve the relay until `cancel_token` is cancelled.
///
/// # Errors
///
/// Returns [`RelayError::Serve`] if the server fails.
pub async fn serve(
    listener: TcpListener,
    config: &RelayConfig,
    cancel_token: CancellationToken,
) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("WebSocket server is running on ws://{}", addr);
    }

    let app = router(config, cancel_token.clone());

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { cancel_token.cancelled().await })
    .await?;

    info!("Relay stopped");
    Ok(())
}

/// Log an inbound message, returning the step it signals if any
#[must_use]
pub fn handle_message(text: &str) -> Option<i64> {
    info!("Received message: {}", text);

    let step = relay_step_signal(text);
    if step.is_some() {
        info!("Step signal received: {}", text);
    }
    step
}

async fn handle_websocket(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<RelayState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, addr, state))
}

/// Manages a single client connection
async fn handle_socket(mut socket: WebSocket, addr: SocketAddr, state: RelayState) {
    info!("Client connected");
    debug!("Client address: {}", addr);

    // Subscribe before greeting so nothing sent after the greeting is missed
    let mut forward_rx = state.forward_tx.as_ref().map(broadcast::Sender::subscribe);

    if socket
        .send(Message::Text(state.greeting.clone().into()))
        .await
        .is_err()
    {
        info!("Client disconnected");
        return;
    }

    loop {
        tokio::select! {
            () = state.cancel_token.cancelled() => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
            frame = socket.recv() => match Inbound::from_frame(frame) {
                Inbound::Text(text) => {
                    if handle_message(&text).is_none() {
                        debug!("No step signal in message from {}", addr);
                    }
                    if let Some(tx) = &state.forward_tx {
                        // No receivers just means no one else is connected
                        let _ = tx.send(Forwarded { from: addr, text });
                    }
                }
                Inbound::Ignored => {}
                Inbound::Closed => break,
            },
            forwarded = recv_forwarded(forward_rx.as_mut()) => match forwarded {
                Ok(message) if message.from != addr => {
                    if socket.send(Message::Text(message.text.into())).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => {
                    warn!("Client {} missed {} forwarded messages", addr, n);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!("Client disconnected");
}

/// Next forwarded message, or never when forwarding is off
async fn recv_forwarded(
    rx: Option<&mut broadcast::Receiver<Forwarded>>,
) -> std::result::Result<Forwarded, RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_message_step_signals() {
        assert_eq!(handle_message("1"), Some(1));
        assert_eq!(handle_message("10"), Some(10));
        assert_eq!(handle_message("7abc"), Some(7));
        assert_eq!(handle_message(" 3"), Some(3));
    }

    #[test]
    fn test_handle_message_ignores_others() {
        assert_eq!(handle_message("0"), None);
        assert_eq!(handle_message("11"), None);
        assert_eq!(handle_message("15"), None);
        assert_eq!(handle_message("song:Alone"), None);
        assert_eq!(handle_message("hello"), None);
        assert_eq!(handle_message(""), None);
    }

    #[test]
    fn test_inbound_text_and_binary() {
        assert_eq!(
            Inbound::from_frame(Some(Ok(Message::Text("5".into())))),
            Inbound::Text("5".into())
        );
        assert_eq!(
            Inbound::from_frame(Some(Ok(Message::Binary(vec![b'4', 0xFF].into())))),
            Inbound::Text("4\u{FFFD}".into())
        );
    }

    #[test]
    fn test_inbound_control_frames() {
        assert_eq!(
            Inbound::from_frame(Some(Ok(Message::Ping(Vec::new().into())))),
            Inbound::Ignored
        );
        assert_eq!(Inbound::from_frame(Some(Ok(Message::Close(None)))), Inbound::Closed);
        assert_eq!(Inbound::from_frame(None), Inbound::Closed);
    }
}
