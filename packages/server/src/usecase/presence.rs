//! Presence Tracker: who is in which room right now.
//!
//! The tracker owns an explicit membership index (connection → user session,
//! room → connections). It is mutated only through [`PresenceTracker::join`]
//! and [`PresenceTracker::leave`], and both require a [`RoomLock`] so that
//! membership changes in a room, and the broadcasts they trigger, are
//! serialized per room. Different rooms never contend.

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::domain::{
    ChatStore, ConnectionId, RoomId, StoreError, UserSession, Username, sort_occupants,
};

use super::error::PresenceError;

/// Exclusive access to one room's membership and broadcast stream.
///
/// Released on drop.
pub struct RoomLock {
    room_id: RoomId,
    _guard: OwnedMutexGuard<()>,
}

impl RoomLock {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }
}

#[derive(Default)]
struct MembershipIndex {
    sessions: HashMap<ConnectionId, UserSession>,
    rooms: HashMap<RoomId, BTreeSet<ConnectionId>>,
}

impl MembershipIndex {
    fn insert(&mut self, session: UserSession) {
        self.rooms
            .entry(session.room_id.clone())
            .or_default()
            .insert(session.connection_id.clone());
        self.sessions.insert(session.connection_id.clone(), session);
    }

    fn remove(&mut self, connection_id: &ConnectionId, room_id: &RoomId) -> Option<UserSession> {
        if self.sessions.get(connection_id)?.room_id != *room_id {
            return None;
        }
        let session = self.sessions.remove(connection_id)?;
        if let Some(members) = self.rooms.get_mut(room_id) {
            members.remove(connection_id);
            if members.is_empty() {
                self.rooms.remove(room_id);
            }
        }
        Some(session)
    }
}

pub struct PresenceTracker {
    store: Arc<dyn ChatStore>,
    room_locks: Mutex<HashMap<RoomId, Arc<Mutex<()>>>>,
    index: RwLock<MembershipIndex>,
}

impl PresenceTracker {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self {
            store,
            room_locks: Mutex::new(HashMap::new()),
            index: RwLock::new(MembershipIndex::default()),
        }
    }

    /// Enter the critical section of `room_id`
    ///
    /// A lock is created on first use and kept. Callers only lock rooms that
    /// exist in the registry or that the connection has joined.
    pub async fn lock_room(&self, room_id: &RoomId) -> RoomLock {
        let room_mutex = {
            let mut locks = self.room_locks.lock().await;
            locks.entry(room_id.clone()).or_default().clone()
        };
        RoomLock {
            room_id: room_id.clone(),
            _guard: room_mutex.lock_owned().await,
        }
    }

    /// Register `connection_id` in the locked room.
    ///
    /// The new session is visible to [`users_in_room`](Self::users_in_room)
    /// and [`connections_in_room`](Self::connections_in_room) once this returns.
    pub async fn join(
        &self,
        lock: &RoomLock,
        connection_id: ConnectionId,
        username: Username,
    ) -> Result<UserSession, PresenceError> {
        if self.index.read().await.sessions.contains_key(&connection_id) {
            return Err(PresenceError::DuplicateSession(connection_id.into_string()));
        }
        if self
            .store
            .find_user_session_by_connection_id(&connection_id)
            .await?
            .is_some()
        {
            return Err(PresenceError::DuplicateSession(connection_id.into_string()));
        }

        let session = UserSession::new(connection_id, lock.room_id().clone(), username);
        self.store
            .create_user_session(session.clone())
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => {
                    PresenceError::DuplicateSession(session.connection_id.to_string())
                }
                other => PresenceError::Store(other),
            })?;

        self.index.write().await.insert(session.clone());
        tracing::debug!(
            "Connection '{}' joined room '{}' as '{}'",
            session.connection_id,
            session.room_id,
            session.username
        );
        Ok(session)
    }

    /// Remove `connection_id` from the locked room. Safe to call repeatedly.
    ///
    /// A failing store delete is logged; the connection is dropped from the
    /// index regardless so it no longer receives room broadcasts.
    pub async fn leave(&self, lock: &RoomLock, connection_id: &ConnectionId) -> Option<UserSession> {
        let removed = self
            .index
            .write()
            .await
            .remove(connection_id, lock.room_id());

        match self
            .store
            .delete_user_session_by_connection_id(connection_id)
            .await
        {
            Ok(Some(stale)) if removed.is_none() => {
                tracing::debug!(
                    "Removed stale user session of connection '{}' in room '{}'",
                    connection_id,
                    stale.room_id
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    "Failed to delete user session of connection '{}': {}",
                    connection_id,
                    e
                );
            }
        }

        removed
    }

    /// Live occupants of `room_id`, sorted by username then connection id
    pub async fn users_in_room(&self, room_id: &RoomId) -> Result<Vec<UserSession>, StoreError> {
        let stored = self.store.find_user_sessions_by_room(room_id).await?;
        let index = self.index.read().await;
        let mut users: Vec<UserSession> = stored
            .into_iter()
            .filter(|session| index.sessions.contains_key(&session.connection_id))
            .collect();
        sort_occupants(&mut users);
        Ok(users)
    }

    /// Broadcast targets of `room_id`
    pub async fn connections_in_room(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let index = self.index.read().await;
        index
            .rooms
            .get(room_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn current_room(&self, connection_id: &ConnectionId) -> Option<RoomId> {
        let index = self.index.read().await;
        index
            .sessions
            .get(connection_id)
            .map(|session| session.room_id.clone())
    }

    /// Number of connections currently joined to any room
    pub async fn online_count(&self) -> usize {
        self.index.read().await.sessions.len()
    }

    #[cfg(test)]
    pub(crate) async fn room_lock_count(&self) -> usize {
        self.room_locks.lock().await.len()
    }
}
