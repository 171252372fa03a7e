//! Shared application state

use std::sync::Arc;

use super::events::PollEvent;
use super::hub::{BroadcastReport, ConnectionHub};
use crate::config::HubConfig;
use crate::poll_store::PollStore;

/// State shared by the HTTP and WebSocket handlers
pub struct AppState {
    /// Poll data
    pub polls: Arc<PollStore>,

    /// Registry of live WebSocket connections
    pub hub: Arc<ConnectionHub>,
}

impl AppState {
    /// Create state with an empty store and a fresh hub
    pub fn new(config: HubConfig) -> Self {
        Self {
            polls: Arc::new(PollStore::new()),
            hub: Arc::new(ConnectionHub::new(config)),
        }
    }

    /// Publish an event to every connected client.
    ///
    /// Call only after the corresponding change is committed to the store.
    pub async fn publish(&self, event: PollEvent) -> BroadcastReport {
        self.hub.broadcast(&event).await
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}
