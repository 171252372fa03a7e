//! Connection handle for one live WebSocket client

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::events::PollEvent;
use super::transport::FrameSink;
use crate::error::TransportError;

/// Process-wide handle ids, never reused
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque connection identifier, not exposed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Liveness state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Registered and believed reachable
    Open,
    /// Transport observed as disconnected, still registered until swept
    Closing,
    /// Removed from the registry; terminal
    Closed,
}

/// Server-side representative of one client connection
///
/// Writes go through a per-handle async mutex so frames from the broadcast
/// path and the liveness prober never interleave.
pub struct ConnectionHandle {
    id: ConnectionId,
    state: Mutex<ConnectionState>,
    sink: tokio::sync::Mutex<Box<dyn FrameSink>>,
    retired: Notify,
    connected_at: DateTime<Utc>,
}

impl ConnectionHandle {
    pub(crate) fn new(sink: Box<dyn FrameSink>) -> Self {
        Self {
            id: ConnectionId::next(),
            state: Mutex::new(ConnectionState::Open),
            sink: tokio::sync::Mutex::new(sink),
            retired: Notify::new(),
            connected_at: Utc::now(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Record that the transport is no longer connected.
    ///
    /// The handle stays registered until it is unregistered or swept.
    pub fn mark_disconnected(&self) {
        let mut state = self.state.lock();
        if *state == ConnectionState::Open {
            *state = ConnectionState::Closing;
        }
    }

    /// Only called by the registry while it holds the membership lock
    pub(crate) fn mark_closed(&self) {
        *self.state.lock() = ConnectionState::Closed;
        self.retired.notify_one();
    }

    /// Resolves once the registry has retired this handle
    pub async fn closed(&self) {
        while self.state() != ConnectionState::Closed {
            self.retired.notified().await;
        }
    }

    /// Send a text frame, bounded by `timeout`
    pub async fn send_text(&self, text: &str, timeout: Duration) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }

        let send = async {
            let mut sink = self.sink.lock().await;
            sink.send_text(text).await
        };

        match tokio::time::timeout(timeout, send).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(timeout)),
        }
    }

    /// Serialize and send a single event
    pub async fn send_event(&self, event: &PollEvent, timeout: Duration) -> Result<(), TransportError> {
        let text = event.to_wire()?;
        self.send_text(&text, timeout).await
    }

    /// Close the underlying transport, bounded by `timeout`
    pub async fn close(&self, timeout: Duration) {
        let close = async {
            let mut sink = self.sink.lock().await;
            sink.close().await;
        };
        let _ = tokio::time::timeout(timeout, close).await;
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("connected_at", &self.connected_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::websocket::transport::memory;

    const SEND_TIMEOUT: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn test_ids_are_unique() {
        let (a, _, _peer_a) = memory::pair();
        let (b, _, _peer_b) = memory::pair();
        let a = ConnectionHandle::new(Box::new(a));
        let b = ConnectionHandle::new(Box::new(b));
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_send_event_reaches_peer() {
        let (sink, _source, mut peer) = memory::pair();
        let handle = ConnectionHandle::new(Box::new(sink));

        handle
            .send_event(&PollEvent::NewPoll { poll_id: 5 }, SEND_TIMEOUT)
            .await
            .unwrap();

        assert_eq!(peer.recv().await.unwrap(), r#"{"type":"new_poll","poll_id":5}"#);
    }

    #[tokio::test]
    async fn test_mark_disconnected_only_from_open() {
        let (sink, _source, _peer) = memory::pair();
        let handle = ConnectionHandle::new(Box::new(sink));

        handle.mark_disconnected();
        assert_eq!(handle.state(), ConnectionState::Closing);

        handle.mark_closed();
        handle.mark_disconnected();
        assert_eq!(handle.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_send_on_non_open_handle_fails() {
        let (sink, _source, mut peer) = memory::pair();
        let handle = ConnectionHandle::new(Box::new(sink));
        handle.mark_disconnected();

        let err = handle.send_text("x", SEND_TIMEOUT).await.unwrap_err();
        assert!(matches!(err, TransportError::Closed));
        assert!(peer.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_closed_wakes_waiter() {
        let (sink, _source, _peer) = memory::pair();
        let handle = std::sync::Arc::new(ConnectionHandle::new(Box::new(sink)));

        let waiter = {
            let handle = std::sync::Arc::clone(&handle);
            tokio::spawn(async move { handle.closed().await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        handle.mark_closed();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_closed_returns_immediately_when_already_closed() {
        let (sink, _source, _peer) = memory::pair();
        let handle = ConnectionHandle::new(Box::new(sink));
        handle.mark_closed();

        tokio::time::timeout(Duration::from_secs(1), handle.closed())
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_send_times_out() {
        let (sink, _source, peer) = memory::pair();
        let handle = ConnectionHandle::new(Box::new(sink));
        peer.stall_sends();

        let err = handle.send_text("x", SEND_TIMEOUT).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout(d) if d == SEND_TIMEOUT));
    }
}
