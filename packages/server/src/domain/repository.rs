//! Store trait definition.
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{ChatMessage, ConnectionId, Room, RoomId, StoreError, Timestamp, UserSession};

/// Chat Store trait
///
/// ルーム・参加中ユーザー・メッセージの永続的な記録。
/// 各操作は単独ではアトミックだが、複数操作にまたがるトランザクションは提供しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// ID でルームを取得
    async fn find_room_by_id(&self, room_id: &RoomId) -> Result<Option<Room>, StoreError>;

    /// 全てのルームを名前の昇順で取得
    async fn find_all_rooms(&self) -> Result<Vec<Room>, StoreError>;

    /// ユーザーセッションを作成（同じ接続 ID が既にあれば `StoreError::Conflict`）
    async fn create_user_session(&self, session: UserSession) -> Result<(), StoreError>;

    /// 接続 ID でユーザーセッションを取得
    async fn find_user_session_by_connection_id(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<UserSession>, StoreError>;

    /// 接続 ID でユーザーセッションを削除し、削除したレコードを返す（冪等）
    async fn delete_user_session_by_connection_id(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<UserSession>, StoreError>;

    /// ルーム内のユーザーセッションをユーザー名の昇順で取得
    async fn find_user_sessions_by_room(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<UserSession>, StoreError>;

    /// 全てのユーザーセッションを削除し、削除件数を返す（起動時のクリーンアップ用）
    async fn delete_all_user_sessions(&self) -> Result<usize, StoreError>;

    /// メッセージを追加
    async fn create_message(&self, message: ChatMessage) -> Result<(), StoreError>;

    /// `since` 以降のメッセージのうち最新 `limit` 件を、タイムスタンプの昇順で取得
    async fn find_messages_by_room_since(
        &self,
        room_id: &RoomId,
        since: Timestamp,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError>;
}
