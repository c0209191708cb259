use crate::libs::core::models::{EventKind, UserId};
use crate::libs::storage::records::{
    BlockRecord, ChatRoomRecord, LikeEdgeRecord, NotificationEventRecord,
};
use thiserror::Error;
use uuid::Uuid;

pub trait Storage {
    type Transaction<'s>: Transactional + RelationStore + 's
    where
        Self: 's;
}

pub trait Transactional {
    fn commit(self) -> Result<(), StoreError>;
    fn rollback(self) -> Result<(), StoreError>;
}

/// Directed like edges. Inserts are idempotent: `insert_like_edge` reports
/// whether the row is new, and an already-present edge is success.
pub trait LikeEdgeStore {
    fn insert_like_edge(&mut self, record: &LikeEdgeRecord) -> Result<bool, StoreError>;
    fn delete_like_edge(&mut self, liker: &UserId, liked: &UserId) -> Result<bool, StoreError>;
    fn like_edge_exists(&mut self, liker: &UserId, liked: &UserId) -> Result<bool, StoreError>;
    fn load_likers_of(&mut self, liked: &UserId) -> Result<Vec<LikeEdgeRecord>, StoreError>;
}

/// Symmetric blocks, keyed on the canonical pair.
pub trait BlockStore {
    fn insert_block(&mut self, record: &BlockRecord) -> Result<bool, StoreError>;
    fn block_exists(&mut self, a: &UserId, b: &UserId) -> Result<bool, StoreError>;
}

/// Chat rooms, keyed on the canonical pair. `insert_room` is idempotent the
/// same way like edges are.
pub trait RoomStore {
    fn insert_room(&mut self, record: &ChatRoomRecord) -> Result<bool, StoreError>;
    fn load_room(&mut self, a: &UserId, b: &UserId) -> Result<Option<ChatRoomRecord>, StoreError>;
    fn delete_room(&mut self, a: &UserId, b: &UserId) -> Result<bool, StoreError>;
    fn load_rooms_for(&mut self, user: &UserId) -> Result<Vec<ChatRoomRecord>, StoreError>;
}

/// The recipient-ordered event log behind the notification feed.
pub trait NotificationStore {
    fn insert_event(&mut self, record: &NotificationEventRecord) -> Result<(), StoreError>;
    fn load_events_for(
        &mut self,
        recipient: &UserId,
    ) -> Result<Vec<NotificationEventRecord>, StoreError>;
    fn mark_event_read(&mut self, event_id: &Uuid) -> Result<bool, StoreError>;
    fn mark_kind_read(&mut self, recipient: &UserId, kind: &EventKind)
        -> Result<usize, StoreError>;
    fn count_unread(&mut self, recipient: &UserId) -> Result<u64, StoreError>;
}

pub trait RelationStore: LikeEdgeStore + BlockStore + RoomStore + NotificationStore {}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Sqlite Error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("ConnectionPool Error: {0}")]
    ConnectionPool(#[from] r2d2::Error),
    #[error("Initialisation Error: {0}")]
    Initialisation(String),
    #[error("Deserialisation Error: {0}")]
    Deserialisation(String),
}
