//! Per-connection liveness loop
//!
//! Waits for inbound frames with an idle timeout. Inbound traffic is
//! acknowledged with a `ping` event; silence triggers a keepalive `ping`.
//! The loop ends when the client goes away or a send fails, and the handle
//! is unregistered on the way out. A handle retired by the registry stops
//! its loop immediately and the socket is closed.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use super::connection::{ConnectionHandle, ConnectionState};
use super::events::PollEvent;
use super::hub::ConnectionHub;
use super::transport::{FrameSource, Inbound};

/// Prober state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    /// Waiting for inbound data, bounded by the idle timeout
    Waiting,
    /// Idle timeout elapsed; a keepalive must be sent
    Probing,
    Terminated,
}

/// Why a liveness loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Close frame or end of stream
    ClientClosed,
    /// Read error from the transport
    ReadFailed,
    /// Acknowledging client input failed
    AckFailed,
    /// Keepalive probe after an idle period failed
    ProbeFailed,
    /// The registry already retired the handle (e.g. a failed broadcast)
    Retired,
}

/// Liveness loop for a single connection
pub struct LivenessProber {
    hub: Arc<ConnectionHub>,
    handle: Arc<ConnectionHandle>,
    idle_timeout: Duration,
    send_timeout: Duration,
    state: ProbeState,
}

impl LivenessProber {
    /// Create a prober using the hub's timing configuration
    pub fn new(hub: Arc<ConnectionHub>, handle: Arc<ConnectionHandle>) -> Self {
        let idle_timeout = hub.config().idle_timeout;
        let send_timeout = hub.config().send_timeout;
        Self {
            hub,
            handle,
            idle_timeout,
            send_timeout,
            state: ProbeState::Waiting,
        }
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    /// Drive the loop until the connection terminates
    pub async fn run<S>(mut self, mut source: S) -> ExitReason
    where
        S: FrameSource,
    {
        let reason = loop {
            if self.handle.state() == ConnectionState::Closed {
                break ExitReason::Retired;
            }

            let step = match self.state {
                ProbeState::Waiting => self.wait(&mut source).await,
                ProbeState::Probing => self.probe().await,
                ProbeState::Terminated => break ExitReason::Retired,
            };

            match step {
                Ok(next) => self.state = next,
                Err(reason) => break reason,
            }
        };

        self.state = ProbeState::Terminated;
        self.handle.close(self.send_timeout).await;
        self.hub.unregister(&self.handle);
        debug!(conn_id = %self.handle.id(), ?reason, "liveness loop finished");
        reason
    }

    async fn wait<S>(&self, source: &mut S) -> Result<ProbeState, ExitReason>
    where
        S: FrameSource,
    {
        let frame = tokio::select! {
            _ = self.handle.closed() => return Err(ExitReason::Retired),
            frame = timeout(self.idle_timeout, source.next_frame()) => frame,
        };

        match frame {
            Err(_) => Ok(ProbeState::Probing),
            Ok(None) | Ok(Some(Ok(Inbound::Close))) => {
                self.handle.mark_disconnected();
                Err(ExitReason::ClientClosed)
            }
            Ok(Some(Err(e))) => {
                debug!(conn_id = %self.handle.id(), error = %e, "websocket read failed");
                self.handle.mark_disconnected();
                Err(ExitReason::ReadFailed)
            }
            Ok(Some(Ok(_))) => {
                // Client payloads are not interpreted; they only prove liveness
                self.handle
                    .send_event(&PollEvent::ack(), self.send_timeout)
                    .await
                    .map(|_| ProbeState::Waiting)
                    .map_err(|e| {
                        debug!(conn_id = %self.handle.id(), error = %e, "ack failed");
                        ExitReason::AckFailed
                    })
            }
        }
    }

    async fn probe(&self) -> Result<ProbeState, ExitReason> {
        self.handle
            .send_event(&PollEvent::keepalive(), self.send_timeout)
            .await
            .map(|_| ProbeState::Waiting)
            .map_err(|e| {
                debug!(conn_id = %self.handle.id(), error = %e, "keepalive probe failed");
                ExitReason::ProbeFailed
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::websocket::transport::memory;
    use crate::config::HubConfig;

    fn hub() -> Arc<ConnectionHub> {
        Arc::new(ConnectionHub::new(HubConfig {
            idle_timeout: Duration::from_secs(30),
            send_timeout: Duration::from_secs(1),
            max_connections: 16,
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn test_inbound_frame_is_acknowledged() {
        let hub = hub();
        let (sink, source, mut peer) = memory::pair();
        let handle = hub.register(sink).unwrap();
        let task = tokio::spawn(LivenessProber::new(Arc::clone(&hub), handle).run(source));

        assert!(peer.send(Inbound::Text("hello".to_string())));
        assert_eq!(
            peer.recv().await.unwrap(),
            r#"{"type":"ping","message":"connected"}"#
        );
        assert_eq!(hub.size(), 1);

        drop(peer);
        assert_eq!(task.await.unwrap(), ExitReason::ClientClosed);
        assert_eq!(hub.size(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_frame_terminates() {
        let hub = hub();
        let (sink, source, peer) = memory::pair();
        let handle = hub.register(sink).unwrap();

        peer.send(Inbound::Close);
        let reason = LivenessProber::new(Arc::clone(&hub), Arc::clone(&handle))
            .run(source)
            .await;

        assert_eq!(reason, ExitReason::ClientClosed);
        assert_eq!(handle.state(), ConnectionState::Closed);
        assert_eq!(hub.size(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_probe_unregisters() {
        let hub = hub();
        let (sink, source, peer) = memory::pair();
        let handle = hub.register(sink).unwrap();
        peer.fail_sends();

        let reason = LivenessProber::new(Arc::clone(&hub), handle).run(source).await;

        assert_eq!(reason, ExitReason::ProbeFailed);
        assert_eq!(hub.size(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retired_handle_stops_loop() {
        let hub = hub();
        let (sink, source, _peer) = memory::pair();
        let handle = hub.register(sink).unwrap();
        hub.unregister(&handle);

        let reason = LivenessProber::new(Arc::clone(&hub), handle).run(source).await;
        assert_eq!(reason, ExitReason::Retired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retirement_interrupts_idle_wait() {
        let hub = hub();
        let (sink, source, _peer) = memory::pair();
        let handle = hub.register(sink).unwrap();
        let task = tokio::spawn(LivenessProber::new(Arc::clone(&hub), Arc::clone(&handle)).run(source));
        tokio::task::yield_now().await;

        hub.unregister(&handle);

        let reason = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reason, ExitReason::Retired);
    }
}
