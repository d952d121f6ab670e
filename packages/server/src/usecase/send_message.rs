//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 同じルームの他の参加者へのリレーと、履歴への保存
//!
//! ### なぜこのテストが必要か
//! - 送信者本人にはメッセージが返らないことを保証
//! - 参加していないルーム宛てのメッセージがリレーされないことを保証
//! - 保存に失敗してもリレーは行われることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：2 人のルームでのリレーと保存
//! - 異常系：未参加の接続からの送信、Store 障害
//! - エッジケース：送信者しかいないルーム（リレー対象なし）

use std::sync::Arc;

use crate::domain::{ChatMessage, ChatStore, ConnectionId, MessagePusher, Notification};

use super::{error::SendMessageError, presence::PresenceTracker};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Store（データアクセス層の抽象化）
    store: Arc<dyn ChatStore>,
    presence: Arc<PresenceTracker>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        store: Arc<dyn ChatStore>,
        presence: Arc<PresenceTracker>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            store,
            presence,
            message_pusher,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `from` - メッセージ送信者の接続 ID
    /// * `message` - クライアントから受け取ったメッセージ（そのままリレーする）
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - リレー先の接続 ID リスト
    /// * `Err(SendMessageError)` - 送信者が宛先のルームに参加していない
    pub async fn execute(
        &self,
        from: &ConnectionId,
        message: ChatMessage,
    ) -> Result<Vec<ConnectionId>, SendMessageError> {
        // 1. 送信者が宛先のルームに参加しているか確認
        //    未参加のルームのロックは作成しない
        self.ensure_member(from, &message).await?;

        let targets = {
            let _lock = self.presence.lock_room(&message.room_id).await;
            // ロック取得までに退出している可能性があるため再確認
            self.ensure_member(from, &message).await?;

            // 2. 送信者以外の参加者にリレー
            let targets: Vec<ConnectionId> = self
                .presence
                .connections_in_room(&message.room_id)
                .await
                .into_iter()
                .filter(|id| id != from)
                .collect();
            if let Err(e) = self
                .message_pusher
                .broadcast(&targets, &Notification::ChatMessage(message.clone()))
                .await
            {
                tracing::warn!(
                    "Failed to relay message in room '{}': {}",
                    message.room_id,
                    e
                );
            }
            targets
        };

        // 3. ロック解放後に保存
        let room_id = message.room_id.clone();
        if let Err(e) = self.store.create_message(message).await {
            tracing::warn!("Failed to persist message in room '{}': {}", room_id, e);
        }

        tracing::debug!(
            "Relayed message from '{}' to {} connections in room '{}'",
            from,
            targets.len(),
            room_id
        );
        Ok(targets)
    }

    async fn ensure_member(
        &self,
        from: &ConnectionId,
        message: &ChatMessage,
    ) -> Result<(), SendMessageError> {
        if self.presence.current_room(from).await.as_ref() != Some(&message.room_id) {
            return Err(SendMessageError::NotInRoom {
                connection_id: from.to_string(),
                room_id: message.room_id.to_string(),
            });
        }
        Ok(())
    }
}
