//! WebSocket control link to the robot.
//!
//! Connects once at startup. There is no reconnection: after a failed
//! connect, a close or an error, the link stays closed for the session and
//! the controller silently drops what it would have sent.

use dancebot_core::{ControlLink, ControlMessage, CoreError};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How long to wait for the robot to accept the connection
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

type RobotSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct WsControlLink {
    open: Arc<AtomicBool>,
    outgoing: mpsc::UnboundedSender<String>,
    cancel_token: CancellationToken,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl WsControlLink {
    /// Connect to the robot at `url`.
    ///
    /// Never fails: if the robot cannot be reached the returned link is
    /// closed. Background tasks run until [`WsControlLink::close`].
    pub async fn connect(url: &str) -> Self {
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let link = Self {
            open: Arc::new(AtomicBool::new(false)),
            outgoing,
            cancel_token: CancellationToken::new(),
            writer: Mutex::new(None),
        };

        info!("Connecting to robot at {}...", url);
        let socket = match tokio::time::timeout(CONNECT_TIMEOUT, connect_async(url)).await {
            Ok(Ok((socket, _))) => socket,
            Ok(Err(e)) => {
                warn!("Could not connect to robot: {}", e);
                return link;
            }
            Err(_) => {
                warn!("Timed out connecting to robot after {:?}", CONNECT_TIMEOUT);
                return link;
            }
        };

        info!("Connected to robot");
        link.open.store(true, Ordering::SeqCst);

        let (sink, stream) = socket.split();
        let writer = tokio::spawn(write_loop(
            sink,
            outgoing_rx,
            Arc::clone(&link.open),
            link.cancel_token.clone(),
        ));
        tokio::spawn(read_loop(
            stream,
            Arc::clone(&link.open),
            link.cancel_token.clone(),
        ));

        if let Ok(mut slot) = link.writer.lock() {
            *slot = Some(writer);
        }
        link
    }

    /// Flush queued messages and close the connection
    pub async fn close(&self) {
        self.cancel_token.cancel();

        let writer = self.writer.lock().ok().and_then(|mut slot| slot.take());
        if let Some(writer) = writer {
            let _ = writer.await;
        }
    }
}

impl ControlLink for WsControlLink {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn send(&self, message: &ControlMessage) -> dancebot_core::Result<()> {
        if !self.is_open() {
            return Err(CoreError::LinkClosed);
        }
        self.outgoing
            .send(message.to_string())
            .map_err(|_| CoreError::LinkClosed)
    }
}

async fn write_loop(
    mut sink: SplitSink<RobotSocket, Message>,
    mut outgoing_rx: mpsc::UnboundedReceiver<String>,
    open: Arc<AtomicBool>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            // Queued messages go out before a requested close
            biased;

            text = outgoing_rx.recv() => {
                let Some(text) = text else { break };
                debug!("Sending to robot: {}", text);
                if let Err(e) = sink.send(Message::text(text)).await {
                    warn!("Failed to send to robot: {}", e);
                    break;
                }
            }
            () = cancel_token.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
        }
    }

    open.store(false, Ordering::SeqCst);
}

async fn read_loop(
    mut stream: SplitStream<RobotSocket>,
    open: Arc<AtomicBool>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    info!("Received from robot: {}", text.as_str());
                }
                Some(Ok(Message::Binary(bytes))) => {
                    info!("Received from robot: {}", String::from_utf8_lossy(&bytes));
                }
                Some(Ok(Message::Close(_))) | None => {
                    info!("Robot closed the control link");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Control link error: {}", e);
                    break;
                }
            },
        }
    }

    open.store(false, Ordering::SeqCst);
}
