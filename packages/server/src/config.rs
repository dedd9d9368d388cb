//! Relay configuration.

use std::time::Duration;

use crate::domain::{RoomId, value_object::DEFAULT_ROOM_NAME};

/// Timing and presentation settings injected into the usecases.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Base origin of shareable room links, without trailing slash.
    pub public_url: String,
    /// Name given to rooms created without one.
    pub default_room_name: String,
    /// Messages replayed to a participant on join.
    pub backlog_limit: usize,
    /// Delay before a room's initial message is sent after the host joins.
    pub initial_message_delay: Duration,
    /// Delay before a message is reported `delivered`.
    pub delivered_delay: Duration,
    /// Delay before a message is reported `read`.
    pub read_delay: Duration,
    /// Grace period before an empty room is deleted.
    pub reap_delay: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            public_url: "http://localhost:3000".to_string(),
            default_room_name: DEFAULT_ROOM_NAME.to_string(),
            backlog_limit: 50,
            initial_message_delay: Duration::from_millis(1000),
            delivered_delay: Duration::from_millis(500),
            read_delay: Duration::from_millis(2000),
            reap_delay: Duration::from_secs(5 * 60),
        }
    }
}

impl RelayConfig {
    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.public_url = public_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Shareable link of a room: `<public_url>?room=<id>`.
    pub fn room_url(&self, room_id: &RoomId) -> String {
        format!("{}?room={}", self.public_url, room_id)
    }
}
