//! UseCase: 接続処理
//!
//! トランスポート接続ごとに送信チャンネルを登録し、`hello` を送信します。
//! この時点ではどのルームにも参加していません（Connected 状態）。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, Notification, PusherChannel};

/// 接続のユースケース
pub struct ConnectParticipantUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 接続を登録して `hello` を送信
    ///
    /// # Arguments
    ///
    /// * `connection_id` - サーバーが割り当てた接続 ID
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> Result<(), MessagePushError> {
        self.message_pusher
            .register_client(connection_id.clone(), sender)
            .await;
        self.message_pusher
            .push_to(&connection_id, &Notification::Hello)
            .await
    }
}
