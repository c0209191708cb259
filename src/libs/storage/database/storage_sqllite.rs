use crate::libs::core::models::{EventKind, PairKey, UserId};
use crate::libs::storage::database::storage_traits::{
    BlockStore, LikeEdgeStore, NotificationStore, RelationStore, RoomStore, Storage, StoreError,
    Transactional,
};
use crate::libs::storage::records::{
    BlockRecord, ChatRoomRecord, LikeEdgeRecord, NotificationEventRecord,
};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Result, Transaction};
use uuid::Uuid;

pub struct SqliteTransaction<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> SqliteTransaction<'conn> {
    pub fn new(
        conn: &'conn mut PooledConnection<SqliteConnectionManager>,
    ) -> Result<Self, StoreError> {
        let trans = conn.transaction()?;
        Ok(Self { tx: trans })
    }

    pub fn inner(&self) -> &Transaction {
        &self.tx
    }
}

impl<'conn> Transactional for SqliteTransaction<'conn> {
    fn commit(self) -> Result<(), StoreError> {
        Ok(self.tx.commit()?)
    }

    fn rollback(self) -> Result<(), StoreError> {
        Ok(self.tx.rollback()?)
    }
}

#[derive(Debug)]
pub struct SqliteStore {
    conn_pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    pub fn new(db_path: &str) -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::new(manager)?;
        Ok(Self { conn_pool: pool })
    }

    pub fn new_connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, StoreError> {
        Ok(self.conn_pool.get()?)
    }
}

impl Storage for SqliteStore {
    type Transaction<'s> = SqliteTransaction<'s>
    where
        Self: 's;
}

impl<'conn> RelationStore for SqliteTransaction<'conn> {}

fn parse_uuid_column(index: usize, value: String) -> Result<Uuid> {
    Uuid::parse_str(&value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl<'conn> LikeEdgeStore for SqliteTransaction<'conn> {
    fn insert_like_edge(&mut self, record: &LikeEdgeRecord) -> Result<bool, StoreError> {
        let inserted = self.tx.execute(
            "INSERT OR IGNORE INTO like_edges (edge_id, liker_id, liked_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.edge_id.to_string(),
                record.liker_id,
                record.liked_id,
                record.created_at
            ],
        )?;
        Ok(inserted > 0)
    }

    fn delete_like_edge(&mut self, liker: &UserId, liked: &UserId) -> Result<bool, StoreError> {
        let deleted = self.tx.execute(
            "DELETE FROM like_edges WHERE liker_id = ?1 AND liked_id = ?2",
            params![liker, liked],
        )?;
        Ok(deleted > 0)
    }

    fn like_edge_exists(&mut self, liker: &UserId, liked: &UserId) -> Result<bool, StoreError> {
        let row = self
            .tx
            .query_row(
                "SELECT 1 FROM like_edges WHERE liker_id = ?1 AND liked_id = ?2",
                params![liker, liked],
                |_| Ok(()),
            )
            .optional()?;
        Ok(row.is_some())
    }

    fn load_likers_of(&mut self, liked: &UserId) -> Result<Vec<LikeEdgeRecord>, StoreError> {
        let mut stmt = self.tx.prepare(
            "SELECT edge_id, liker_id, liked_id, created_at FROM like_edges
             WHERE liked_id = ?1 ORDER BY created_at DESC, edge_id DESC",
        )?;
        let rows = stmt.query_map(params![liked], |row| {
            let edge_id: String = row.get(0)?;
            Ok(LikeEdgeRecord::from_db(
                parse_uuid_column(0, edge_id)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

impl<'conn> BlockStore for SqliteTransaction<'conn> {
    fn insert_block(&mut self, record: &BlockRecord) -> Result<bool, StoreError> {
        let inserted = self.tx.execute(
            "INSERT OR IGNORE INTO blocks (block_id, user_low, user_high, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.block_id.to_string(),
                record.user_low,
                record.user_high,
                record.created_at
            ],
        )?;
        Ok(inserted > 0)
    }

    fn block_exists(&mut self, a: &UserId, b: &UserId) -> Result<bool, StoreError> {
        let pair = PairKey::normalised(a, b);
        let row = self
            .tx
            .query_row(
                "SELECT 1 FROM blocks WHERE user_low = ?1 AND user_high = ?2",
                params![pair.user_low, pair.user_high],
                |_| Ok(()),
            )
            .optional()?;
        Ok(row.is_some())
    }
}

impl<'conn> RoomStore for SqliteTransaction<'conn> {
    fn insert_room(&mut self, record: &ChatRoomRecord) -> Result<bool, StoreError> {
        let inserted = self.tx.execute(
            "INSERT OR IGNORE INTO chat_rooms (room_id, user_low, user_high, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.room_id.to_string(),
                record.user_low,
                record.user_high,
                record.created_at
            ],
        )?;
        Ok(inserted > 0)
    }

    fn load_room(&mut self, a: &UserId, b: &UserId) -> Result<Option<ChatRoomRecord>, StoreError> {
        let pair = PairKey::normalised(a, b);
        let room = self
            .tx
            .query_row(
                "SELECT room_id, user_low, user_high, created_at FROM chat_rooms
                 WHERE user_low = ?1 AND user_high = ?2",
                params![pair.user_low, pair.user_high],
                |row| {
                    let room_id: String = row.get(0)?;
                    Ok(ChatRoomRecord::from_db(
                        parse_uuid_column(0, room_id)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                    ))
                },
            )
            .optional()?;
        Ok(room)
    }

    fn delete_room(&mut self, a: &UserId, b: &UserId) -> Result<bool, StoreError> {
        let pair = PairKey::normalised(a, b);
        let deleted = self.tx.execute(
            "DELETE FROM chat_rooms WHERE user_low = ?1 AND user_high = ?2",
            params![pair.user_low, pair.user_high],
        )?;
        Ok(deleted > 0)
    }

    fn load_rooms_for(&mut self, user: &UserId) -> Result<Vec<ChatRoomRecord>, StoreError> {
        let mut stmt = self.tx.prepare(
            "SELECT room_id, user_low, user_high, created_at FROM chat_rooms
             WHERE user_low = ?1 OR user_high = ?1 ORDER BY created_at DESC, room_id DESC",
        )?;
        let rows = stmt.query_map(params![user], |row| {
            let room_id: String = row.get(0)?;
            Ok(ChatRoomRecord::from_db(
                parse_uuid_column(0, room_id)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

impl<'conn> NotificationStore for SqliteTransaction<'conn> {
    fn insert_event(&mut self, record: &NotificationEventRecord) -> Result<(), StoreError> {
        self.tx.execute(
            "INSERT INTO notifications
             (event_id, kind, sender_id, recipient_id, reference_id, is_read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.event_id.to_string(),
                record.kind,
                record.sender_id,
                record.recipient_id,
                record.reference_id.to_string(),
                record.is_read,
                record.created_at
            ],
        )?;
        Ok(())
    }

    fn load_events_for(
        &mut self,
        recipient: &UserId,
    ) -> Result<Vec<NotificationEventRecord>, StoreError> {
        let mut stmt = self.tx.prepare(
            "SELECT event_id, kind, sender_id, recipient_id, reference_id, is_read, created_at
             FROM notifications WHERE recipient_id = ?1
             ORDER BY created_at ASC, event_id ASC",
        )?;
        let rows = stmt.query_map(params![recipient], |row| {
            let event_id: String = row.get(0)?;
            let reference_id: String = row.get(4)?;
            Ok(NotificationEventRecord::from_db(
                parse_uuid_column(0, event_id)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                parse_uuid_column(4, reference_id)?,
                row.get(5)?,
                row.get(6)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn mark_event_read(&mut self, event_id: &Uuid) -> Result<bool, StoreError> {
        let updated = self.tx.execute(
            "UPDATE notifications SET is_read = 1 WHERE event_id = ?1",
            params![event_id.to_string()],
        )?;
        Ok(updated > 0)
    }

    fn mark_kind_read(
        &mut self,
        recipient: &UserId,
        kind: &EventKind,
    ) -> Result<usize, StoreError> {
        let updated = self.tx.execute(
            "UPDATE notifications SET is_read = 1
             WHERE recipient_id = ?1 AND kind = ?2 AND is_read = 0",
            params![recipient, kind],
        )?;
        Ok(updated)
    }

    fn count_unread(&mut self, recipient: &UserId) -> Result<u64, StoreError> {
        let count: i64 = self.tx.query_row(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = ?1 AND is_read = 0",
            params![recipient],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
