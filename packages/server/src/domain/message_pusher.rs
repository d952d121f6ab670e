//! Outbound notification model and the MessagePusher trait.
//!
//! UseCase 層は通知の「内容」と「宛先」だけを決め、
//! 送信手段（WebSocket など）は Infrastructure 層の実装に任せます。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    ChatMessage, ConnectionId, MessagePushError, RequestId, Room, RoomSnapshot, Timestamp,
    UserSession, Username,
};

/// Channel carrying serialized frames to one connection's writer task
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Server → client events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Sent immediately on connect
    Hello,
    /// Reply to `getRoomList`
    RoomList {
        request_id: RequestId,
        rooms: Vec<Room>,
    },
    /// Reply to `userJoinRequest`; `None` means the join failed
    JoinResult {
        request_id: RequestId,
        snapshot: Option<RoomSnapshot>,
    },
    ChatMessage(ChatMessage),
    UserJoined {
        username: Username,
        timestamp: Timestamp,
    },
    UserLeft {
        username: Username,
        timestamp: Timestamp,
    },
    OnlineUsers(Vec<UserSession>),
}

/// MessagePusher trait
///
/// 接続ごとの送信チャンネルを管理し、通知を個別またはまとめて送信する。
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを登録解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定の接続に通知を送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        notification: &Notification,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続に通知を送信
    ///
    /// 送信できなかった宛先はスキップし、残りの宛先への送信を続ける。
    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        notification: &Notification,
    ) -> Result<(), MessagePushError>;
}
