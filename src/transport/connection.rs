//! Shared WebSocket connection and event loop.
//!
//! This module owns the client's single change channel. The channel is
//! receive-only from the application's point of view: the server pushes
//! change frames and nothing is sent back apart from protocol-level
//! close and pong frames.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Incoming text frames, decoded once and routed through the [`Dispatcher`]
//! - Shutdown requests from the client
//! - Remote close and transport errors, which end the loop

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, connect_async};
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::error::{Error, Result};

use super::Dispatcher;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Close the socket and stop the loop.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// The client's shared WebSocket change channel.
///
/// Dropping the connection ends its event loop.
pub struct Connection {
    /// Endpoint this connection was opened against.
    url: Url,
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Set once the event loop has terminated.
    closed: Arc<AtomicBool>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.url.as_str())
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Opens a WebSocket to `url` and starts routing its frames.
    ///
    /// Resolves once the handshake completes.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if the handshake exceeds `connect_timeout`
    /// - [`Error::WebSocket`] if the connection or upgrade fails
    pub async fn open(
        url: &Url,
        connect_timeout: Duration,
        dispatcher: Arc<Dispatcher>,
    ) -> Result<Self> {
        debug!(url = %url, "Opening WebSocket connection");

        let (ws_stream, response) = timeout(connect_timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| Error::connection_timeout(timeout_millis(connect_timeout)))??;

        info!(url = %url, status = %response.status(), "WebSocket connection established");

        Ok(Self::new(url.clone(), ws_stream, dispatcher))
    }

    /// Wraps an established WebSocket stream.
    ///
    /// Spawns the event loop task internally.
    pub(crate) fn new<S>(url: Url, ws_stream: WebSocketStream<S>, dispatcher: Arc<Dispatcher>) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));

        tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            dispatcher,
            Arc::clone(&closed),
        ));

        Self {
            url,
            command_tx,
            closed,
        }
    }

    /// Returns the endpoint URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns `true` while the event loop is running.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }

    /// Requests a graceful close.
    ///
    /// Returns immediately; the event loop sends a close frame and exits.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop<S>(
        ws_stream: WebSocketStream<S>,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        dispatcher: Arc<Dispatcher>,
        closed: Arc<AtomicBool>,
    ) where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming frames from the server
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_message(&text, &dispatcher);
                        }

                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Commands from the client
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            let _ = ws_write.close().await;
                            break;
                        }
                    }
                }
            }
        }

        closed.store(true, Ordering::Release);
        debug!("Event loop terminated");
    }

    /// Routes one text frame through the dispatcher.
    fn handle_incoming_message(text: &str, dispatcher: &Dispatcher) {
        match dispatcher.dispatch_frame(text) {
            Ok(delivered) => trace!(delivered, "Change event routed"),
            Err(e) => warn!(error = %e, text = %text, "Dropping frame that is not a change event"),
        }
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
fn timeout_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Tests
// ============================================================================
