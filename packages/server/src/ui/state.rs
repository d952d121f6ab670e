//! Server state shared by every handler.

use std::sync::Arc;

use crate::usecase::{
    ConnectParticipantUseCase, DisconnectParticipantUseCase, GetRoomDetailUseCase,
    GetRoomListUseCase, JoinRoomUseCase, RoomRegistry, SendMessageUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectParticipantUseCase（接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// GetRoomListUseCase（ルーム一覧取得のユースケース）
    pub get_room_list_usecase: Arc<GetRoomListUseCase>,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// HTTP API のルーム一覧用
    pub room_registry: Arc<RoomRegistry>,
}
