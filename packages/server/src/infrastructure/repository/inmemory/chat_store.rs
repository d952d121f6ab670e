//! InMemory ChatStore 実装
//!
//! ドメイン層が定義する ChatStore trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ルームは起動時に投入され、以降は読み取り専用です。
//! メッセージはルームごとにタイムスタンプ順で保持し、同じタイムスタンプは到着順に並びます。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    ChatMessage, ChatStore, ConnectionId, Room, RoomId, StoreError, Timestamp, UserSession,
};

#[derive(Default)]
struct Tables {
    rooms: HashMap<RoomId, Room>,
    user_sessions: HashMap<ConnectionId, UserSession>,
    messages: HashMap<RoomId, Vec<ChatMessage>>,
}

/// インメモリ ChatStore 実装
#[derive(Default)]
pub struct InMemoryChatStore {
    tables: RwLock<Tables>,
}

impl InMemoryChatStore {
    /// 空の InMemoryChatStore を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ルームを投入した InMemoryChatStore を作成
    ///
    /// 同じ ID のルームが複数ある場合は後のものが優先されます。
    pub fn with_rooms(rooms: impl IntoIterator<Item = Room>) -> Self {
        let tables = Tables {
            rooms: rooms
                .into_iter()
                .map(|room| (room.id.clone(), room))
                .collect(),
            ..Tables::default()
        };
        Self {
            tables: RwLock::new(tables),
        }
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn find_room_by_id(&self, room_id: &RoomId) -> Result<Option<Room>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.rooms.get(room_id).cloned())
    }

    async fn find_all_rooms(&self) -> Result<Vec<Room>, StoreError> {
        let tables = self.tables.read().await;
        let mut rooms: Vec<Room> = tables.rooms.values().cloned().collect();
        rooms.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(rooms)
    }

    async fn create_user_session(&self, session: UserSession) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.user_sessions.contains_key(&session.connection_id) {
            return Err(StoreError::Conflict(format!(
                "user session for connection '{}'",
                session.connection_id
            )));
        }
        tables
            .user_sessions
            .insert(session.connection_id.clone(), session);
        Ok(())
    }

    async fn find_user_session_by_connection_id(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<UserSession>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.user_sessions.get(connection_id).cloned())
    }

    async fn delete_user_session_by_connection_id(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<UserSession>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.user_sessions.remove(connection_id))
    }

    async fn find_user_sessions_by_room(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<UserSession>, StoreError> {
        let tables = self.tables.read().await;
        let mut sessions: Vec<UserSession> = tables
            .user_sessions
            .values()
            .filter(|session| &session.room_id == room_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(sessions)
    }

    async fn delete_all_user_sessions(&self) -> Result<usize, StoreError> {
        let mut tables = self.tables.write().await;
        let count = tables.user_sessions.len();
        tables.user_sessions.clear();
        Ok(count)
    }

    async fn create_message(&self, message: ChatMessage) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let messages = tables.messages.entry(message.room_id.clone()).or_default();
        // 同じタイムスタンプのメッセージの後ろに挿入して到着順を保つ
        let position = messages.partition_point(|m| m.timestamp <= message.timestamp);
        messages.insert(position, message);
        Ok(())
    }

    async fn find_messages_by_room_since(
        &self,
        room_id: &RoomId,
        since: Timestamp,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let tables = self.tables.read().await;
        let Some(messages) = tables.messages.get(room_id) else {
            return Ok(Vec::new());
        };

        // 時間窓で絞り込んでから、最新 limit 件を昇順のまま返す
        let start = messages.partition_point(|m| m.timestamp < since);
        let in_window = &messages[start..];
        let skip = in_window.len().saturating_sub(limit);
        Ok(in_window[skip..].to_vec())
    }
}
