//! Tunables of the chat core.

use std::time::Duration;

/// Default history window (`maxAge`) in seconds
pub const DEFAULT_HISTORY_WINDOW_SECS: u64 = 3600;

/// Default number of history messages delivered on join
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Runtime configuration shared by the usecases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Only messages newer than `now - history_window` are delivered on join
    pub history_window: Duration,
    /// Maximum number of history messages delivered on join
    pub history_limit: usize,
    /// Simulated latency before replying to `getRoomList`. Zero disables it.
    pub room_list_delay: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_window: Duration::from_secs(DEFAULT_HISTORY_WINDOW_SECS),
            history_limit: DEFAULT_HISTORY_LIMIT,
            room_list_delay: Duration::ZERO,
        }
    }
}
