//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    infrastructure::dto::http::{NotFoundDto, RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
    usecase::GetRoomDetailError,
};

/// Liveness endpoint
pub async fn alive() -> Json<serde_json::Value> {
    Json(serde_json::json!({"message": "I am alive!!"}))
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Response {
    match state.room_registry.list_rooms().await {
        Ok(rooms) => {
            // Domain Model から DTO への変換
            let summaries: Vec<RoomSummaryDto> = rooms.iter().map(Into::into).collect();
            Json(summaries).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to list rooms: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Response {
    match state.get_room_detail_usecase.execute(room_id).await {
        Ok(snapshot) => {
            // Domain Model から DTO への変換
            let detail = RoomDetailDto {
                id: snapshot.room.id.as_str().to_string(),
                name: snapshot.room.name.clone(),
                users: snapshot.users.iter().map(Into::into).collect(),
                messages: snapshot.messages.iter().map(Into::into).collect(),
            };
            Json(detail).into_response()
        }
        Err(GetRoomDetailError::RoomNotFound(_)) => not_found().await.into_response(),
        Err(GetRoomDetailError::Store(e)) => {
            tracing::error!("Failed to load room detail: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> (StatusCode, Json<NotFoundDto>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundDto {
            message: "Not Found".to_string(),
        }),
    )
}
