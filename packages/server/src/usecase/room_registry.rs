//! Room Registry: read-only view of the rooms known to the store.

use std::sync::Arc;

use crate::domain::{ChatStore, Room, RoomId, StoreError};

/// Pass-through to the store. Rooms are immutable once created, so nothing is cached.
pub struct RoomRegistry {
    store: Arc<dyn ChatStore>,
}

impl RoomRegistry {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    /// All rooms, sorted by name ascending
    pub async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        self.store.find_all_rooms().await
    }

    pub async fn get_room(&self, room_id: &RoomId) -> Result<Option<Room>, StoreError> {
        self.store.find_room_by_id(room_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repository::InMemoryChatStore;

    #[tokio::test]
    async fn test_list_and_get_rooms() {
        // テスト項目: ルーム一覧は名前順で、ID で個別に取得できる
        // given (前提条件):
        let store = Arc::new(InMemoryChatStore::with_rooms([
            Room::new(RoomId::new("b".to_string()).unwrap(), "Zebra"),
            Room::new(RoomId::new("a".to_string()).unwrap(), "Aardvark"),
        ]));
        let registry = RoomRegistry::new(store);

        // when (操作):
        let rooms = registry.list_rooms().await.unwrap();
        let found = registry
            .get_room(&RoomId::new("b".to_string()).unwrap())
            .await
            .unwrap();
        let missing = registry
            .get_room(&RoomId::new("c".to_string()).unwrap())
            .await
            .unwrap();

        // then (期待する結果):
        let names: Vec<&str> = rooms.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Aardvark", "Zebra"]);
        assert_eq!(found.map(|r| r.name), Some("Zebra".to_string()));
        assert!(missing.is_none());
    }
}
