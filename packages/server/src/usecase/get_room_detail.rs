//! UseCase: ルーム詳細の取得（HTTP API 用）

use std::sync::Arc;

use crate::domain::{RoomId, RoomSnapshot};

use super::{
    error::GetRoomDetailError, history::RecentHistory, presence::PresenceTracker,
    room_registry::RoomRegistry,
};

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    registry: Arc<RoomRegistry>,
    presence: Arc<PresenceTracker>,
    history: Arc<RecentHistory>,
}

impl GetRoomDetailUseCase {
    pub fn new(
        registry: Arc<RoomRegistry>,
        presence: Arc<PresenceTracker>,
        history: Arc<RecentHistory>,
    ) -> Self {
        Self {
            registry,
            presence,
            history,
        }
    }

    /// ルームの参加者一覧と直近の履歴を取得
    ///
    /// 参加時の ack と同じ時間窓・件数で履歴を返します。
    pub async fn execute(&self, room_id: String) -> Result<RoomSnapshot, GetRoomDetailError> {
        let room_id =
            RoomId::new(room_id.clone()).map_err(|_| GetRoomDetailError::RoomNotFound(room_id))?;
        let room = self
            .registry
            .get_room(&room_id)
            .await?
            .ok_or_else(|| GetRoomDetailError::RoomNotFound(room_id.to_string()))?;

        let users = self.presence.users_in_room(&room_id).await?;
        let messages = self.history.load(&room_id).await?;

        Ok(RoomSnapshot {
            room,
            users,
            messages,
        })
    }
}
