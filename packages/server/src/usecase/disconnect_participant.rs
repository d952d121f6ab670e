//! UseCase: 切断処理
//!
//! 送信チャンネルの登録を解除し、ルームに参加していた場合は退出させて
//! 残りの参加者に `userLeft` と更新後の `onlineUsers` を送信します。

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::domain::{
    ChatStore, ConnectionId, MessagePusher, Notification, Timestamp, UserSession,
};

use super::presence::PresenceTracker;

/// 切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Store（データアクセス層の抽象化）
    store: Arc<dyn ChatStore>,
    presence: Arc<PresenceTracker>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        store: Arc<dyn ChatStore>,
        presence: Arc<PresenceTracker>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            presence,
            message_pusher,
            clock,
        }
    }

    /// 切断処理を実行
    ///
    /// 何度呼んでも安全です。2 回目以降や未参加の接続では何も送信しません。
    ///
    /// # Returns
    ///
    /// 退出したユーザーセッション（参加していなかった場合は `None`）
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<UserSession> {
        // 1. 送信チャンネルの登録解除
        self.message_pusher.unregister_client(connection_id).await;

        // 2. 参加中のルームを特定（索引になければ Store に残ったレコードを参照）
        let room_id = match self.presence.current_room(connection_id).await {
            Some(room_id) => room_id,
            None => match self
                .store
                .find_user_session_by_connection_id(connection_id)
                .await
            {
                Ok(Some(stale)) => stale.room_id,
                Ok(None) => return None,
                Err(e) => {
                    tracing::warn!(
                        "Failed to look up user session of connection '{}': {}",
                        connection_id,
                        e
                    );
                    return None;
                }
            },
        };

        // 3. ルームロックを保持したまま退出と通知
        let lock = self.presence.lock_room(&room_id).await;
        let left = self.presence.leave(&lock, connection_id).await?;

        let remaining = self.presence.connections_in_room(&room_id).await;
        let notice = Notification::UserLeft {
            username: left.username.clone(),
            timestamp: Timestamp::new(self.clock.now_millis()),
        };
        if let Err(e) = self.message_pusher.broadcast(&remaining, &notice).await {
            tracing::warn!("Failed to broadcast userLeft in room '{}': {}", room_id, e);
        }

        match self.presence.users_in_room(&room_id).await {
            Ok(users) => {
                if let Err(e) = self
                    .message_pusher
                    .broadcast(&remaining, &Notification::OnlineUsers(users))
                    .await
                {
                    tracing::warn!("Failed to broadcast onlineUsers in room '{}': {}", room_id, e);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to load occupants of room '{}': {}", room_id, e);
            }
        }

        tracing::info!("'{}' left room '{}'", left.username, room_id);
        Some(left)
    }
}
