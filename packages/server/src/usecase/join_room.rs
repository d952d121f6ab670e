//! UseCase: ルーム参加処理
//!
//! ## 処理の流れ
//!
//! 1. ルームの存在確認
//! 2. ルームロックを取得して参加者として登録
//! 3. 直近の履歴と参加者一覧を読み込み（失敗したら登録を取り消す）
//! 4. ロックを保持したまま、参加者に ack、他の参加者に `userJoined` と `onlineUsers` を送信
//!
//! 参加者本人は自分の参加で発生する `onlineUsers` を受け取りません。
//! 参加者一覧は ack の `room.users` に含まれています。

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::domain::{
    ConnectionId, MessagePusher, Notification, RequestId, RoomId, RoomSnapshot, Timestamp,
    Username,
};

use super::{
    error::JoinError, history::RecentHistory, presence::PresenceTracker,
    room_registry::RoomRegistry,
};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    registry: Arc<RoomRegistry>,
    presence: Arc<PresenceTracker>,
    history: Arc<RecentHistory>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(
        registry: Arc<RoomRegistry>,
        presence: Arc<PresenceTracker>,
        history: Arc<RecentHistory>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            presence,
            history,
            message_pusher,
            clock,
        }
    }

    /// ルーム参加を実行
    ///
    /// 成功・失敗のどちらの場合も、要求元には `request_id` を付けた ack を必ず 1 回送信します。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        request_id: RequestId,
        username: Username,
        room_id: RoomId,
    ) -> Result<RoomSnapshot, JoinError> {
        let result = self
            .join(connection_id, request_id, username, &room_id)
            .await;
        if let Err(e) = &result {
            tracing::warn!(
                "Connection '{}' failed to join room '{}': {}",
                connection_id,
                room_id,
                e
            );
            self.reply(connection_id, request_id, None).await;
        }
        result
    }

    /// 参加要求そのものが不正な場合（ユーザー名が空など）の失敗応答
    pub async fn reject(&self, connection_id: &ConnectionId, request_id: RequestId) {
        self.reply(connection_id, request_id, None).await;
    }

    async fn join(
        &self,
        connection_id: &ConnectionId,
        request_id: RequestId,
        username: Username,
        room_id: &RoomId,
    ) -> Result<RoomSnapshot, JoinError> {
        let room = self
            .registry
            .get_room(room_id)
            .await?
            .ok_or_else(|| JoinError::RoomNotFound(room_id.to_string()))?;

        let lock = self.presence.lock_room(room_id).await;
        let session = self
            .presence
            .join(&lock, connection_id.clone(), username)
            .await?;

        let loaded = async {
            let messages = self.history.load(room_id).await?;
            let users = self.presence.users_in_room(room_id).await?;
            Ok::<_, JoinError>((messages, users))
        }
        .await;
        let (messages, users) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                // 登録を取り消して、参加前の状態に戻す
                self.presence.leave(&lock, connection_id).await;
                return Err(e);
            }
        };

        let snapshot = RoomSnapshot {
            room,
            users: users.clone(),
            messages,
        };
        self.reply(connection_id, request_id, Some(snapshot.clone()))
            .await;

        let others: Vec<ConnectionId> = self
            .presence
            .connections_in_room(room_id)
            .await
            .into_iter()
            .filter(|id| id != connection_id)
            .collect();
        let joined = Notification::UserJoined {
            username: session.username.clone(),
            timestamp: Timestamp::new(self.clock.now_millis()),
        };
        if let Err(e) = self.message_pusher.broadcast(&others, &joined).await {
            tracing::warn!("Failed to broadcast userJoined in room '{}': {}", room_id, e);
        }
        if let Err(e) = self
            .message_pusher
            .broadcast(&others, &Notification::OnlineUsers(users))
            .await
        {
            tracing::warn!("Failed to broadcast onlineUsers in room '{}': {}", room_id, e);
        }

        tracing::info!(
            "'{}' joined room '{}' ({} online)",
            session.username,
            room_id,
            snapshot.users.len()
        );
        Ok(snapshot)
    }

    async fn reply(
        &self,
        connection_id: &ConnectionId,
        request_id: RequestId,
        snapshot: Option<RoomSnapshot>,
    ) {
        let reply = Notification::JoinResult {
            request_id,
            snapshot,
        };
        if let Err(e) = self.message_pusher.push_to(connection_id, &reply).await {
            tracing::warn!("Failed to send join result to '{}': {}", connection_id, e);
        }
    }
}
