//! Recent message history of a room.

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::domain::{ChatMessage, ChatStore, RoomId, StoreError, Timestamp};

use super::config::ChatConfig;

/// Loads the recent history delivered to clients.
///
/// Messages are filtered to the time window first, then the latest
/// `history_limit` of them are returned in ascending timestamp order.
pub struct RecentHistory {
    store: Arc<dyn ChatStore>,
    clock: Arc<dyn Clock>,
    window_millis: i64,
    limit: usize,
}

impl RecentHistory {
    pub fn new(store: Arc<dyn ChatStore>, clock: Arc<dyn Clock>, config: &ChatConfig) -> Self {
        Self {
            store,
            clock,
            window_millis: i64::try_from(config.history_window.as_millis()).unwrap_or(i64::MAX),
            limit: config.history_limit,
        }
    }

    pub async fn load(&self, room_id: &RoomId) -> Result<Vec<ChatMessage>, StoreError> {
        let since = Timestamp::new(self.clock.now_millis()).saturating_sub_millis(self.window_millis);
        self.store
            .find_messages_by_room_since(room_id, since, self.limit)
            .await
    }
}
