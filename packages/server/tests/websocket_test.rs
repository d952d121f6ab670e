//! End-to-end tests: a real server on an ephemeral port, driven over WebSocket and HTTP.

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use parlor_server::{
    domain::{Room, RoomId},
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryChatStore},
    ui::Server,
    usecase::{
        ChatConfig, ConnectParticipantUseCase, DisconnectParticipantUseCase,
        GetRoomDetailUseCase, GetRoomListUseCase, JoinRoomUseCase, PresenceTracker,
        RecentHistory, RoomRegistry, SendMessageUseCase,
    },
};
use parlor_shared::time::{SystemClock, get_timestamp_millis, timestamp_to_rfc3339};
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::oneshot};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Helper struct to manage server lifecycle
struct TestServer {
    port: u16,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Start a server with rooms r1 "General" and r2 "Random"
    async fn start() -> Self {
        let store = Arc::new(InMemoryChatStore::with_rooms([
            Room::new(RoomId::new("r1".to_string()).unwrap(), "General"),
            Room::new(RoomId::new("r2".to_string()).unwrap(), "Random"),
        ]));
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let clock = Arc::new(SystemClock);
        let config = ChatConfig::default();

        let room_registry = Arc::new(RoomRegistry::new(store.clone()));
        let presence = Arc::new(PresenceTracker::new(store.clone()));
        let history = Arc::new(RecentHistory::new(store.clone(), clock.clone(), &config));

        let server = Server::new(
            Arc::new(ConnectParticipantUseCase::new(message_pusher.clone())),
            Arc::new(DisconnectParticipantUseCase::new(
                store.clone(),
                presence.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            Arc::new(GetRoomListUseCase::new(
                room_registry.clone(),
                message_pusher.clone(),
                config.room_list_delay,
            )),
            Arc::new(JoinRoomUseCase::new(
                room_registry.clone(),
                presence.clone(),
                history.clone(),
                message_pusher.clone(),
                clock,
            )),
            Arc::new(SendMessageUseCase::new(
                store,
                presence.clone(),
                message_pusher,
            )),
            Arc::new(GetRoomDetailUseCase::new(
                room_registry.clone(),
                presence,
                history,
            )),
            room_registry,
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(server.serve(listener, async {
            let _ = rx.await;
        }));

        TestServer {
            port,
            shutdown: Some(tx),
        }
    }

    fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    /// Connect and consume the `hello` frame
    async fn connect(&self) -> Client {
        let (mut client, _) = connect_async(self.ws_url()).await.unwrap();
        assert_eq!(next_event(&mut client).await, json!({"event": "hello"}));
        client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn send(client: &mut Client, frame: Value) {
    client
        .send(Message::text(frame.to_string()))
        .await
        .unwrap();
}

async fn next_event(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn assert_silent(client: &mut Client) {
    let result = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
    assert!(result.is_err(), "unexpected frame: {:?}", result);
}

async fn join(client: &mut Client, ack_id: u64, username: &str, room_id: &str) -> Value {
    send(
        client,
        json!({
            "event": "userJoinRequest",
            "ackId": ack_id,
            "data": {"username": username, "roomId": room_id},
        }),
    )
    .await;
    next_event(client).await
}

fn usernames(users: &Value) -> Vec<&str> {
    users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_room_list_is_acked_to_requester() {
    // テスト項目: getRoomList に ackId 付きでルーム一覧が返る
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;

    // when (操作):
    send(&mut alice, json!({"event": "getRoomList", "ackId": 1})).await;

    // then (期待する結果):
    assert_eq!(
        next_event(&mut alice).await,
        json!({
            "event": "ack",
            "ackId": 1,
            "data": [
                {"id": "r1", "name": "General"},
                {"id": "r2", "name": "Random"},
            ],
        })
    );
}

#[tokio::test]
async fn test_two_users_chat_in_a_room() {
    // テスト項目: 2 人が同じルームに参加し、メッセージと入退室の通知が正しく届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let ack = join(&mut alice, 1, "alice", "r1").await;
    assert_eq!(ack["ackId"], 1);
    assert_eq!(ack["data"]["success"], true);
    assert_eq!(ack["data"]["room"]["name"], "General");
    assert_eq!(usernames(&ack["data"]["room"]["users"]), vec!["alice"]);
    assert_eq!(ack["data"]["room"]["messages"], json!([]));

    // when (操作): bob が参加
    let mut bob = server.connect().await;
    let ack = join(&mut bob, 1, "bob", "r1").await;

    // then (期待する結果):
    assert_eq!(usernames(&ack["data"]["room"]["users"]), vec!["alice", "bob"]);
    let joined = next_event(&mut alice).await;
    assert_eq!(joined["event"], "userJoined");
    assert_eq!(joined["data"]["username"], "bob");
    let online = next_event(&mut alice).await;
    assert_eq!(online["event"], "onlineUsers");
    assert_eq!(usernames(&online["data"]), vec!["alice", "bob"]);
    // 参加者本人には onlineUsers が届かない
    assert_silent(&mut bob).await;

    // when (操作): alice がメッセージを送信
    let message = json!({"content": "hi", "timestamp": 1, "username": "alice", "roomId": "r1"});
    send(&mut alice, json!({"event": "sendChatMessage", "data": message})).await;

    // then (期待する結果):
    assert_eq!(
        next_event(&mut bob).await,
        json!({"event": "chatMessage", "data": message})
    );
    assert_silent(&mut alice).await;

    // when (操作): bob が切断
    bob.close(None).await.unwrap();

    // then (期待する結果):
    let left = next_event(&mut alice).await;
    assert_eq!(left["event"], "userLeft");
    assert_eq!(left["data"]["username"], "bob");
    let online = next_event(&mut alice).await;
    assert_eq!(online["event"], "onlineUsers");
    assert_eq!(usernames(&online["data"]), vec!["alice"]);
}

#[tokio::test]
async fn test_join_failures_are_acked() {
    // テスト項目: 存在しないルーム、二重参加、不正なユーザー名は失敗の ack になる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let failed = |ack_id: u64| {
        json!({"event": "ack", "ackId": ack_id, "data": {"success": false, "room": null}})
    };

    // when (操作):
    let unknown_room = join(&mut alice, 1, "alice", "nope").await;
    let empty_name = join(&mut alice, 2, "", "r1").await;
    join(&mut alice, 3, "alice", "r1").await;
    let twice = join(&mut alice, 4, "alice", "r2").await;

    // then (期待する結果):
    assert_eq!(unknown_room, failed(1));
    assert_eq!(empty_name, failed(2));
    assert_eq!(twice, failed(4));
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    // テスト項目: 不正なフレームは無視され、接続は維持される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;

    // when (操作):
    alice.send(Message::text("not json")).await.unwrap();
    send(&mut alice, json!({"event": "noSuchEvent"})).await;
    send(&mut alice, json!({"event": "getRoomList", "ackId": 7})).await;

    // then (期待する結果):
    let ack = next_event(&mut alice).await;
    assert_eq!(ack["ackId"], 7);
}

#[tokio::test]
async fn test_http_api() {
    // テスト項目: HTTP API でヘルスチェック、ルーム一覧、ルーム詳細が取得できる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    join(&mut alice, 1, "alice", "r1").await;
    let mut bob = server.connect().await;
    join(&mut bob, 1, "bob", "r1").await;
    let sent_at = get_timestamp_millis();
    let message = json!({"content": "hello", "timestamp": sent_at, "username": "bob", "roomId": "r1"});
    send(&mut bob, json!({"event": "sendChatMessage", "data": message})).await;
    next_event(&mut alice).await; // userJoined
    next_event(&mut alice).await; // onlineUsers
    next_event(&mut alice).await; // chatMessage

    // when (操作):
    let alive: Value = reqwest::get(server.http_url("/"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let health: Value = reqwest::get(server.http_url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rooms: Value = reqwest::get(server.http_url("/api/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let detail: Value = reqwest::get(server.http_url("/api/rooms/r1"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let missing_room = reqwest::get(server.http_url("/api/rooms/nope")).await.unwrap();
    let missing_route = reqwest::get(server.http_url("/nowhere")).await.unwrap();

    // then (期待する結果):
    assert_eq!(alive, json!({"message": "I am alive!!"}));
    assert_eq!(health, json!({"status": "ok"}));
    assert_eq!(
        rooms,
        json!([{"id": "r1", "name": "General"}, {"id": "r2", "name": "Random"}])
    );
    assert_eq!(detail["name"], "General");
    assert_eq!(usernames(&detail["users"]), vec!["alice", "bob"]);
    assert_eq!(
        detail["messages"],
        json!([{
            "content": "hello",
            "timestamp": sent_at,
            "username": "bob",
            "sentAt": timestamp_to_rfc3339(sent_at),
        }])
    );
    assert_eq!(missing_room.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(missing_route.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(
        missing_route.json::<Value>().await.unwrap(),
        json!({"message": "Not Found"})
    );
}
