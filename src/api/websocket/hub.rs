//! Connection registry and event fan-out
//!
//! The membership list is the only shared mutable state in the realtime
//! core. Every membership change, including the `Closed` transition of a
//! removed handle, happens under one lock. Serialization and socket I/O
//! happen outside it: `broadcast` sends to a snapshot and removes the
//! failures afterwards in a single locked step.

use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::connection::{ConnectionHandle, ConnectionId};
use super::events::PollEvent;
use super::transport::FrameSink;
use crate::config::HubConfig;
use crate::error::HubError;

/// Outcome of one broadcast call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections in the snapshot taken at call entry
    pub recipients: usize,
    /// Sends that completed
    pub delivered: usize,
    /// Connections that failed or timed out and were unregistered
    pub dropped: usize,
    /// Connections already closing or retired when the event reached them
    pub skipped: usize,
}

/// Registry of live WebSocket connections
pub struct ConnectionHub {
    /// Insertion-ordered so fan-out order is deterministic
    members: Mutex<Vec<Arc<ConnectionHandle>>>,
    config: HubConfig,
}

impl ConnectionHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            members: Mutex::new(Vec::new()),
            config,
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Whether another connection would be accepted right now
    pub fn has_capacity(&self) -> bool {
        self.members.lock().len() < self.config.max_connections
    }

    /// Wrap a freshly upgraded connection in an `Open` handle and track it
    pub fn register<S>(&self, sink: S) -> Result<Arc<ConnectionHandle>, HubError>
    where
        S: FrameSink + 'static,
    {
        let handle = Arc::new(ConnectionHandle::new(Box::new(sink)));

        let total = {
            let mut members = self.members.lock();
            if members.len() >= self.config.max_connections {
                return Err(HubError::CapacityReached {
                    limit: self.config.max_connections,
                });
            }
            members.push(Arc::clone(&handle));
            members.len()
        };

        info!(conn_id = %handle.id(), total, "websocket connected");
        Ok(handle)
    }

    /// Remove a handle. Idempotent: returns `false` if it was not registered.
    pub fn unregister(&self, handle: &ConnectionHandle) -> bool {
        let (removed, total) = {
            let mut members = self.members.lock();
            let removed = remove_locked(&mut members, handle.id());
            (removed, members.len())
        };

        if removed {
            info!(conn_id = %handle.id(), total, "websocket disconnected");
        }
        removed
    }

    /// Fan an event out to every connection registered at call entry.
    ///
    /// Sends run concurrently, each bounded by the configured send timeout.
    /// Connections whose send fails are unregistered before this returns.
    pub async fn broadcast(&self, event: &PollEvent) -> BroadcastReport {
        let snapshot: Vec<Arc<ConnectionHandle>> = self.members.lock().clone();
        if snapshot.is_empty() {
            return BroadcastReport::default();
        }

        let payload = match event.to_wire() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(event_type = event.kind().as_str(), error = %e, "failed to serialize event");
                return BroadcastReport::default();
            }
        };

        let timeout = self.config.send_timeout;
        let results = join_all(snapshot.iter().map(|handle| {
            let payload = payload.as_str();
            async move { handle.send_text(payload, timeout).await }
        }))
        .await;

        let mut report = BroadcastReport {
            recipients: snapshot.len(),
            ..BroadcastReport::default()
        };
        let mut stale: Vec<ConnectionId> = Vec::new();
        for (handle, result) in snapshot.iter().zip(results) {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) if !handle.is_open() => {
                    debug!(conn_id = %handle.id(), error = %e, "skipping closed connection");
                    report.skipped += 1;
                    stale.push(handle.id());
                }
                Err(e) => {
                    warn!(conn_id = %handle.id(), error = %e, "send failed, removing connection");
                    report.dropped += 1;
                    stale.push(handle.id());
                }
            }
        }

        if !stale.is_empty() {
            let mut members = self.members.lock();
            for id in &stale {
                remove_locked(&mut members, *id);
            }
        }

        debug!(
            event_type = event.kind().as_str(),
            recipients = report.recipients,
            dropped = report.dropped,
            skipped = report.skipped,
            "broadcast event"
        );
        report
    }

    /// Remove handles whose transport was observed closed but whose prober
    /// has not unregistered them yet.
    ///
    /// Returns the number of handles removed.
    pub fn cleanup_dead_connections(&self) -> usize {
        let (removed, total) = {
            let mut members = self.members.lock();
            let before = members.len();
            members.retain(|handle| {
                if handle.is_open() {
                    true
                } else {
                    handle.mark_closed();
                    false
                }
            });
            (before - members.len(), members.len())
        };

        if removed > 0 {
            info!(removed, total, "cleaned up dead connections");
        }
        removed
    }

    /// Number of registered connections
    pub fn size(&self) -> usize {
        self.members.lock().len()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.members.lock().iter().any(|handle| handle.id() == id)
    }
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

fn remove_locked(members: &mut Vec<Arc<ConnectionHandle>>, id: ConnectionId) -> bool {
    match members.iter().position(|handle| handle.id() == id) {
        Some(index) => {
            let handle = members.remove(index);
            handle.mark_closed();
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::websocket::connection::ConnectionState;
    use crate::api::websocket::transport::memory;

    #[tokio::test]
    async fn test_register_and_size() {
        let hub = ConnectionHub::default();
        assert_eq!(hub.size(), 0);

        let (sink, _source, _peer) = memory::pair();
        let handle = hub.register(sink).unwrap();

        assert_eq!(hub.size(), 1);
        assert!(hub.contains(handle.id()));
        assert_eq!(handle.state(), ConnectionState::Open);
    }

    #[tokio::test]
    async fn test_unregister_marks_closed() {
        let hub = ConnectionHub::default();
        let (sink, _source, _peer) = memory::pair();
        let handle = hub.register(sink).unwrap();

        assert!(hub.unregister(&handle));
        assert_eq!(handle.state(), ConnectionState::Closed);
        assert!(!hub.contains(handle.id()));
    }

    #[tokio::test]
    async fn test_capacity_limit() {
        let hub = ConnectionHub::new(HubConfig {
            max_connections: 1,
            ..HubConfig::default()
        });
        let (a, _sa, _pa) = memory::pair();
        let (b, _sb, _pb) = memory::pair();

        let first = hub.register(a).unwrap();
        assert!(!hub.has_capacity());
        assert!(matches!(
            hub.register(b),
            Err(HubError::CapacityReached { limit: 1 })
        ));

        hub.unregister(&first);
        assert!(hub.has_capacity());
    }

    #[tokio::test]
    async fn test_broadcast_to_empty_hub() {
        let hub = ConnectionHub::default();
        let report = hub.broadcast(&PollEvent::NewPoll { poll_id: 1 }).await;
        assert_eq!(report, BroadcastReport::default());
    }

    #[tokio::test]
    async fn test_broadcast_delivers_to_every_member() {
        let hub = ConnectionHub::default();
        let (a, _sa, mut pa) = memory::pair();
        let (b, _sb, mut pb) = memory::pair();
        hub.register(a).unwrap();
        hub.register(b).unwrap();

        let report = hub
            .broadcast(&PollEvent::LikeUpdate { poll_id: 2, likes: 4 })
            .await;

        assert_eq!(
            report,
            BroadcastReport {
                recipients: 2,
                delivered: 2,
                dropped: 0,
                skipped: 0,
            }
        );
        let expected = r#"{"type":"like_update","poll_id":2,"likes":4}"#;
        assert_eq!(pa.try_recv().as_deref(), Some(expected));
        assert_eq!(pb.try_recv().as_deref(), Some(expected));
    }

    #[tokio::test]
    async fn test_closing_handle_is_skipped_not_dropped() {
        let hub = ConnectionHub::default();
        let (a, _sa, mut pa) = memory::pair();
        let (b, _sb, mut pb) = memory::pair();
        hub.register(a).unwrap();
        let closing = hub.register(b).unwrap();
        closing.mark_disconnected();

        let report = hub.broadcast(&PollEvent::NewPoll { poll_id: 3 }).await;

        assert_eq!(
            report,
            BroadcastReport {
                recipients: 2,
                delivered: 1,
                dropped: 0,
                skipped: 1,
            }
        );
        assert!(pa.try_recv().is_some());
        assert!(pb.try_recv().is_none());
        assert!(!hub.contains(closing.id()));
        assert_eq!(closing.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_sweep_skips_open_handles() {
        let hub = ConnectionHub::default();
        let (sink, _source, _peer) = memory::pair();
        hub.register(sink).unwrap();

        assert_eq!(hub.cleanup_dead_connections(), 0);
        assert_eq!(hub.size(), 1);
    }
}
