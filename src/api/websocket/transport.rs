//! Transport seam between the hub and a client socket
//!
//! The hub only writes text frames and the liveness prober only reads
//! frames, so a socket is split into a [`FrameSink`] owned by the
//! connection handle and a [`FrameSource`] owned by the prober task.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};

use crate::error::TransportError;

/// A frame received from the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    Binary(Vec<u8>),
    Ping,
    Pong,
    Close,
}

impl From<Message> for Inbound {
    fn from(msg: Message) -> Self {
        match msg {
            Message::Text(text) => Inbound::Text(text),
            Message::Binary(data) => Inbound::Binary(data),
            Message::Ping(_) => Inbound::Ping,
            Message::Pong(_) => Inbound::Pong,
            Message::Close(_) => Inbound::Close,
        }
    }
}

/// Write half of a client connection
#[async_trait]
pub trait FrameSink: Send {
    async fn send_text(&mut self, text: &str) -> Result<(), TransportError>;

    /// Best-effort close handshake
    async fn close(&mut self);
}

/// Read half of a client connection
#[async_trait]
pub trait FrameSource: Send {
    /// Next inbound frame, or `None` once the peer is gone
    async fn next_frame(&mut self) -> Option<Result<Inbound, TransportError>>;
}

#[async_trait]
impl FrameSink for SplitSink<WebSocket, Message> {
    async fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        self.send(Message::Text(text.to_owned()))
            .await
            .map_err(TransportError::from)
    }

    async fn close(&mut self) {
        let _ = SinkExt::close(self).await;
    }
}

#[async_trait]
impl FrameSource for SplitStream<WebSocket> {
    async fn next_frame(&mut self) -> Option<Result<Inbound, TransportError>> {
        self.next()
            .await
            .map(|result| result.map(Inbound::from).map_err(TransportError::from))
    }
}

/// In-process transport used to drive the hub without sockets
pub mod memory {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::{FrameSink, FrameSource, Inbound};
    use crate::error::TransportError;

    #[derive(Default)]
    struct Faults {
        fail_sends: AtomicBool,
        stall_sends: AtomicBool,
    }

    /// Server-side write half
    pub struct MemorySink {
        tx: mpsc::UnboundedSender<String>,
        faults: Arc<Faults>,
    }

    /// Server-side read half
    pub struct MemorySource {
        rx: mpsc::UnboundedReceiver<Inbound>,
    }

    /// Client side of the pair: reads what the server sent and injects frames
    /// and faults. Dropping it disconnects the pair.
    pub struct MemoryPeer {
        outbound: mpsc::UnboundedReceiver<String>,
        inbound: mpsc::UnboundedSender<Inbound>,
        faults: Arc<Faults>,
    }

    /// Create a connected sink/source pair and its client-side peer
    pub fn pair() -> (MemorySink, MemorySource, MemoryPeer) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let faults = Arc::new(Faults::default());

        (
            MemorySink {
                tx: out_tx,
                faults: Arc::clone(&faults),
            },
            MemorySource { rx: in_rx },
            MemoryPeer {
                outbound: out_rx,
                inbound: in_tx,
                faults,
            },
        )
    }

    #[async_trait]
    impl FrameSink for MemorySink {
        async fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
            if self.faults.stall_sends.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            if self.faults.fail_sends.load(Ordering::SeqCst) {
                return Err(TransportError::WebSocket("broken pipe".to_string()));
            }
            self.tx
                .send(text.to_owned())
                .map_err(|_| TransportError::Closed)
        }

        async fn close(&mut self) {}
    }

    #[async_trait]
    impl FrameSource for MemorySource {
        async fn next_frame(&mut self) -> Option<Result<Inbound, TransportError>> {
            self.rx.recv().await.map(Ok)
        }
    }

    impl MemoryPeer {
        /// Wait for the next frame the server sent
        pub async fn recv(&mut self) -> Option<String> {
            self.outbound.recv().await
        }

        /// Next already-delivered frame, if any
        pub fn try_recv(&mut self) -> Option<String> {
            self.outbound.try_recv().ok()
        }

        /// Drain every frame delivered so far
        pub fn drain(&mut self) -> Vec<String> {
            let mut frames = Vec::new();
            while let Some(frame) = self.try_recv() {
                frames.push(frame);
            }
            frames
        }

        /// Send a frame to the server
        pub fn send(&self, frame: Inbound) -> bool {
            self.inbound.send(frame).is_ok()
        }

        /// Make every subsequent server send fail
        pub fn fail_sends(&self) {
            self.faults.fail_sends.store(true, Ordering::SeqCst);
        }

        /// Make every subsequent server send hang
        pub fn stall_sends(&self) {
            self.faults.stall_sends.store(true, Ordering::SeqCst);
        }
    }
}
