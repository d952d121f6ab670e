//! WebSocket connection handlers.
//!
//! Each connection gets a server-assigned [`ConnectionId`] and two tasks:
//! one reads client events and dispatches them to the UseCases, the other
//! drains the outbound channel into the socket. When either task ends the
//! other is aborted and the disconnect UseCase runs once.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ChatMessage, ConnectionId, ConnectionState, RequestId, RoomId, Username},
    infrastructure::dto::websocket::{ClientEvent, JoinRequestDto},
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let connection_id = ConnectionId::generate();
    ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// # Arguments
///
/// * `rx` - Channel receiver for frames addressed to this connection
/// * `sender` - WebSocket sink to send messages to this client
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive frames
    let (tx, rx) = mpsc::unbounded_channel();
    if let Err(e) = state
        .connect_participant_usecase
        .execute(connection_id.clone(), tx)
        .await
    {
        tracing::warn!("Failed to greet connection '{}': {}", connection_id, e);
    }
    tracing::info!("Connection '{}' established", connection_id);

    let mut send_task = pusher_loop(rx, sender);

    let state_clone = state.clone();
    let connection_id_clone = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        let mut session = ConnectionState::default();
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    dispatch(&state_clone, &connection_id_clone, &mut session, text.as_str())
                        .await;
                }
                Message::Close(_) => {
                    tracing::debug!("Connection '{}' requested close", connection_id_clone);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
        session.disconnect();
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .disconnect_participant_usecase
        .execute(&connection_id)
        .await;
    tracing::info!("Connection '{}' closed", connection_id);
}

async fn dispatch(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    session: &mut ConnectionState,
    text: &str,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Ignoring malformed frame from '{}': {}", connection_id, e);
            return;
        }
    };

    match event {
        ClientEvent::GetRoomList { ack_id } => {
            // 返信の遅延が他のイベント処理を止めないように別タスクで実行
            let state = state.clone();
            let connection_id = connection_id.clone();
            tokio::spawn(async move {
                state
                    .get_room_list_usecase
                    .execute(&connection_id, RequestId::new(ack_id))
                    .await;
            });
        }
        ClientEvent::UserJoinRequest { ack_id, data } => {
            handle_join(state, connection_id, session, RequestId::new(ack_id), data).await;
        }
        ClientEvent::SendChatMessage { data } => {
            let message = match ChatMessage::try_from(data) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!("Invalid chat message from '{}': {}", connection_id, e);
                    return;
                }
            };
            if let Err(e) = state
                .send_message_usecase
                .execute(connection_id, message)
                .await
            {
                tracing::warn!("Dropped chat message: {}", e);
            }
        }
    }
}

async fn handle_join(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    session: &mut ConnectionState,
    request_id: RequestId,
    data: JoinRequestDto,
) {
    let usecase = &state.join_room_usecase;

    let request = Username::new(data.username).and_then(|username| {
        RoomId::new(data.room_id).map(|room_id| (username, room_id))
    });
    let (username, room_id) = match request {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Invalid join request from '{}': {}", connection_id, e);
            usecase.reject(connection_id, request_id).await;
            return;
        }
    };

    if let Err(e) = session.begin_join() {
        tracing::warn!("Join request from '{}' rejected: {}", connection_id, e);
        usecase.reject(connection_id, request_id).await;
        return;
    }

    match usecase
        .execute(connection_id, request_id, username, room_id.clone())
        .await
    {
        Ok(_) => {
            if let Err(e) = session.complete_join(room_id) {
                tracing::warn!("Connection '{}' state out of sync: {}", connection_id, e);
            }
        }
        Err(_) => {
            if let Err(e) = session.abort_join() {
                tracing::warn!("Connection '{}' state out of sync: {}", connection_id, e);
            }
        }
    }
}
