//! UseCase: ルーム一覧の取得
//!
//! 要求した接続にだけ ack で返信します（ブロードキャストはしない）。

use std::{sync::Arc, time::Duration};

use crate::domain::{ConnectionId, MessagePusher, Notification, RequestId, Room};

use super::room_registry::RoomRegistry;

/// ルーム一覧取得のユースケース
pub struct GetRoomListUseCase {
    registry: Arc<RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    /// 返信前の擬似的な遅延（0 で無効）
    reply_delay: Duration,
}

impl GetRoomListUseCase {
    /// 新しい GetRoomListUseCase を作成
    pub fn new(
        registry: Arc<RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        reply_delay: Duration,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            reply_delay,
        }
    }

    /// ルーム一覧を要求元の接続に返信
    ///
    /// Store から取得できなかった場合は空の一覧を返信します。
    pub async fn execute(&self, connection_id: &ConnectionId, request_id: RequestId) -> Vec<Room> {
        let rooms = match self.registry.list_rooms().await {
            Ok(rooms) => rooms,
            Err(e) => {
                tracing::warn!("Failed to list rooms for '{}': {}", connection_id, e);
                Vec::new()
            }
        };
        tracing::debug!("Found {} rooms for '{}'", rooms.len(), connection_id);

        if !self.reply_delay.is_zero() {
            tokio::time::sleep(self.reply_delay).await;
        }

        let reply = Notification::RoomList {
            request_id,
            rooms: rooms.clone(),
        };
        if let Err(e) = self.message_pusher.push_to(connection_id, &reply).await {
            tracing::warn!("Failed to send room list to '{}': {}", connection_id, e);
        }
        rooms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockChatStore, StoreError},
        infrastructure::dto::websocket::{AckPayload, RoomSummaryDto, ServerEvent},
        usecase::test_support::{Fixture, drain},
    };

    #[tokio::test]
    async fn test_room_list_replied_to_requester_only() {
        // テスト項目: ルーム一覧は名前順で、要求した接続にだけ返信される
        // given (前提条件):
        let fixture = Fixture::new();
        let (alice, mut alice_rx) = fixture.connect("c1").await;
        let (_bob, mut bob_rx) = fixture.connect("c2").await;
        let usecase = GetRoomListUseCase::new(
            fixture.registry.clone(),
            fixture.pusher.clone(),
            Duration::ZERO,
        );

        // when (操作):
        let rooms = usecase.execute(&alice, RequestId::new(1)).await;

        // then (期待する結果):
        assert_eq!(rooms.len(), 2);
        assert_eq!(
            drain(&mut alice_rx),
            vec![ServerEvent::Ack {
                ack_id: 1,
                data: AckPayload::RoomList(vec![
                    RoomSummaryDto {
                        id: "r1".to_string(),
                        name: "General".to_string(),
                    },
                    RoomSummaryDto {
                        id: "r2".to_string(),
                        name: "Random".to_string(),
                    },
                ]),
            }]
        );
        assert!(drain(&mut bob_rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_room_list_waits_for_configured_delay() {
        // テスト項目: 遅延が設定されている場合、その時間が経過してから返信される
        // given (前提条件):
        let fixture = Fixture::new();
        let (alice, mut alice_rx) = fixture.connect("c1").await;
        let usecase = GetRoomListUseCase::new(
            fixture.registry.clone(),
            fixture.pusher.clone(),
            Duration::from_millis(1500),
        );
        let started = tokio::time::Instant::now();

        // when (操作):
        usecase.execute(&alice, RequestId::new(2)).await;

        // then (期待する結果):
        assert!(started.elapsed() >= Duration::from_millis(1500));
        assert_eq!(drain(&mut alice_rx).len(), 1);
    }

    #[tokio::test]
    async fn test_room_list_store_failure_replies_empty() {
        // テスト項目: Store が利用できない場合は空の一覧を返信する
        // given (前提条件):
        let mut store = MockChatStore::new();
        store
            .expect_find_all_rooms()
            .returning(|| Err(StoreError::Unavailable("down".to_string())));
        let fixture = Fixture::with_store(Arc::new(store));
        let (alice, mut alice_rx) = fixture.connect("c1").await;
        let usecase = GetRoomListUseCase::new(
            fixture.registry.clone(),
            fixture.pusher.clone(),
            Duration::ZERO,
        );

        // when (操作):
        let rooms = usecase.execute(&alice, RequestId::new(3)).await;

        // then (期待する結果):
        assert!(rooms.is_empty());
        assert_eq!(
            drain(&mut alice_rx),
            vec![ServerEvent::Ack {
                ack_id: 3,
                data: AckPayload::RoomList(vec![]),
            }]
        );
    }
}
