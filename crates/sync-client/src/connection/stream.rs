//! Event stream client
//!
//! Drives one connected socket: each inbound text frame is decoded into a
//! typed mutation event and forwarded into the session's bounded channel.
//! Malformed frames are logged and discarded without touching the
//! connection. The loop ends when the peer closes, the transport drops, or
//! the supervisor signals an intentional shutdown.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use sync_core::CommentEvent;

use crate::protocol::{CloseCode, StreamFrame};

/// A connected client-side WebSocket
pub type WsConnection = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Decodes inbound frames and forwards well-formed events
pub struct EventStreamClient {
    events_tx: mpsc::Sender<CommentEvent>,
    origin: String,
}

impl EventStreamClient {
    /// Create a client forwarding into the given channel
    pub fn new(events_tx: mpsc::Sender<CommentEvent>, origin: impl Into<String>) -> Self {
        Self {
            events_tx,
            origin: origin.into(),
        }
    }

    /// Drive the socket until it closes
    ///
    /// Returns the close code observed, or `None` when the transport dropped
    /// without a close handshake (treated as abnormal by the supervisor).
    pub async fn run(&self, ws: WsConnection, mut shutdown: watch::Receiver<bool>) -> Option<u16> {
        let (mut sink, mut stream) = ws.split();

        loop {
            tokio::select! {
                // Intentional shutdown: close with the reserved normal code.
                // The `wait_for` guard (`watch::Ref`) is dropped inside the
                // async block so it is not held across the awaits below, which
                // would make the spawned connection future `!Send`.
                () = async { let _ = shutdown.wait_for(|stop| *stop).await; } => {
                    let frame = CloseFrame {
                        code: WsCloseCode::Normal,
                        reason: "".into(),
                    };
                    let _ = sink.send(Message::Close(Some(frame))).await;
                    return Some(CloseCode::Normal.as_u16());
                }

                message = stream.next() => match message {
                    Some(Ok(Message::Text(text))) => {
                        match StreamFrame::decode(&text, &self.origin) {
                            Ok(event) => {
                                if self.events_tx.send(event).await.is_err() {
                                    // Apply loop is gone; nothing left to feed
                                    return Some(CloseCode::Normal.as_u16());
                                }
                            }
                            Err(err) => {
                                tracing::warn!(error = %err, "discarding malformed frame");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = sink.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        return frame.map(|f| u16::from(f.code));
                    }
                    Some(Ok(_)) => {
                        // Binary and pong frames carry nothing for us
                    }
                    Some(Err(err)) => {
                        tracing::warn!(error = %err, "event stream transport error");
                        return None;
                    }
                    None => return None,
                }
            }
        }
    }
}
