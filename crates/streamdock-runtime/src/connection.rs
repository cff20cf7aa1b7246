//! WebSocket connection to the host and the event loop that serves it.
//!
//! The loop is single-threaded: each text frame is decoded and dispatched
//! to completion, then every command queued during dispatch is written
//! back before the next frame is read.

use std::net::TcpStream;

use streamdock_plugin::{OutboundQueue, Plugin};
use tracing::{debug, info, warn};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use crate::errors::ConnectionError;

/// Tracing target for connection activity.
pub const CONNECTION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::connection");

/// Frame-level channel to the host.
pub trait HostChannel {
    /// Waits for the next text frame. Returns `Ok(None)` once the host has
    /// closed the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Receive`] when reading fails.
    fn receive(&mut self) -> Result<Option<String>, ConnectionError>;

    /// Writes one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Send`] when writing fails.
    fn send(&mut self, frame: &str) -> Result<(), ConnectionError>;
}

/// [`HostChannel`] backed by a `tungstenite` client socket.
pub struct WebSocketChannel {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl WebSocketChannel {
    /// Opens a WebSocket connection to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Connect`] when the handshake fails.
    pub fn connect(url: &str) -> Result<Self, ConnectionError> {
        let (socket, _response) =
            tungstenite::connect(url).map_err(|source| ConnectionError::Connect {
                url: url.to_owned(),
                source: Box::new(source),
            })?;
        info!(target: CONNECTION_TARGET, url, "connected to host");
        Ok(Self { socket })
    }
}

impl std::fmt::Debug for WebSocketChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketChannel").finish_non_exhaustive()
    }
}

impl HostChannel for WebSocketChannel {
    fn receive(&mut self) -> Result<Option<String>, ConnectionError> {
        loop {
            match self.socket.read() {
                Ok(Message::Text(text)) => return Ok(Some(text)),
                Ok(Message::Close(frame)) => {
                    debug!(target: CONNECTION_TARGET, ?frame, "host sent close frame");
                    // Completes the closing handshake; the socket is done either way.
                    if let Err(error) = self.socket.flush() {
                        debug!(target: CONNECTION_TARGET, %error, "close reply not sent");
                    }
                    return Ok(None);
                }
                Ok(_) => {}
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return Ok(None);
                }
                Err(error) => return Err(ConnectionError::Receive(Box::new(error))),
            }
        }
    }

    fn send(&mut self, frame: &str) -> Result<(), ConnectionError> {
        self.socket
            .send(Message::Text(frame.to_owned()))
            .map_err(|error| ConnectionError::Send(Box::new(error)))
    }
}

/// Registers `plugin` with the host and serves events until the host closes
/// the connection.
///
/// # Errors
///
/// Returns a [`ConnectionError`] when the channel fails. Malformed frames
/// are logged and skipped.
pub fn serve<C>(plugin: &mut Plugin, channel: &mut C, register_event: &str) -> Result<(), ConnectionError>
where
    C: HostChannel + ?Sized,
{
    let registration = plugin
        .registration(register_event)
        .to_json()
        .map_err(ConnectionError::Encode)?;
    channel.send(&registration)?;
    info!(
        target: CONNECTION_TARGET,
        uuid = plugin.uuid(),
        register_event,
        "registered with host"
    );

    let mut queue = OutboundQueue::new();
    if let Err(error) = plugin.request_global_settings(&mut queue) {
        warn!(target: CONNECTION_TARGET, %error, "could not queue global settings request");
    }
    flush(&mut queue, channel)?;

    while let Some(frame) = channel.receive()? {
        if let Err(error) = plugin.handle_frame(&frame, &mut queue) {
            warn!(target: CONNECTION_TARGET, %error, frame = frame.as_str(), "skipping host frame");
        }
        flush(&mut queue, channel)?;
    }

    info!(target: CONNECTION_TARGET, "host closed the connection");
    Ok(())
}

fn flush<C>(queue: &mut OutboundQueue, channel: &mut C) -> Result<(), ConnectionError>
where
    C: HostChannel + ?Sized,
{
    for command in queue.drain() {
        match command.to_json() {
            Ok(frame) => {
                debug!(target: CONNECTION_TARGET, event = command.event_name(), "sending command");
                channel.send(&frame)?;
            }
            Err(error) => {
                warn!(target: CONNECTION_TARGET, %error, "dropping unencodable command");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
