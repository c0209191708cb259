use once_cell::sync::Lazy;
use rusqlite::params;
use std::sync::OnceLock;
use tracing::debug;

use crate::libs::storage::database::storage_sqllite::{SqliteStore, SqliteTransaction};
use crate::libs::storage::database::storage_traits::{StoreError, Transactional};

pub static DATABASE: OnceLock<SqliteStore> = OnceLock::new();

static DEFAULT_SETTINGS: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("app_version", "0.1.0"),
        ("push_enabled", "1"),
        ("feed_page_limit", "200"),
    ]
});

pub(crate) fn initialize_database(path: String) -> Result<(), StoreError> {
    if let Some(store) = DATABASE.get() {
        // Already initialised for this process; just verify the pool still
        // hands out working connections.
        let mut connection = store.new_connection()?;
        let sqlite_transaction = SqliteTransaction::new(&mut connection)?;
        sqlite_transaction
            .inner()
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        debug!("database already initialised, connection verified");
        return Ok(());
    }

    db_migration(path)
}

pub fn db_migration(path: String) -> Result<(), StoreError> {
    let db_store = SqliteStore::new(&path)?;
    DATABASE.set(db_store).map_err(|_| {
        StoreError::Initialisation("database handle can only be set once".to_string())
    })?;

    let database_pool = DATABASE
        .get()
        .ok_or_else(|| StoreError::Initialisation("database handle missing after set".to_string()))?;
    let mut connection = database_pool.new_connection()?;

    let sqlite_transaction = SqliteTransaction::new(&mut connection)?;
    apply_schema(&sqlite_transaction)?;
    sqlite_transaction.commit()?;

    debug!(path = %path, "database initialised");
    Ok(())
}

/// Idempotent schema migration. The uniqueness constraints here are the
/// authority for the pair invariants: one like edge per ordered pair, one
/// block and one chat room per unordered pair.
pub fn apply_schema(sqlite_transaction: &SqliteTransaction) -> Result<(), StoreError> {
    sqlite_transaction.inner().execute_batch(
        "CREATE TABLE IF NOT EXISTS like_edges (
            edge_id TEXT PRIMARY KEY,
            liker_id TEXT NOT NULL,
            liked_id TEXT NOT NULL,
            created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),

            UNIQUE (liker_id, liked_id),
            CHECK (liker_id <> liked_id)
        );
        CREATE INDEX IF NOT EXISTS idx_like_edges_liked_id ON like_edges(liked_id);

        CREATE TABLE IF NOT EXISTS blocks (
            block_id TEXT PRIMARY KEY,
            user_low TEXT NOT NULL,
            user_high TEXT NOT NULL,
            created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),

            UNIQUE (user_low, user_high),
            CHECK (user_low < user_high)
        );

        CREATE TABLE IF NOT EXISTS chat_rooms (
            room_id TEXT PRIMARY KEY,
            user_low TEXT NOT NULL,
            user_high TEXT NOT NULL,
            created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),

            UNIQUE (user_low, user_high),
            CHECK (user_low < user_high)
        );
        CREATE INDEX IF NOT EXISTS idx_chat_rooms_user_high ON chat_rooms(user_high);

        CREATE TABLE IF NOT EXISTS notifications (
            event_id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            sender_id TEXT NOT NULL,
            recipient_id TEXT NOT NULL,
            reference_id TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),

            CHECK (is_read IN (0, 1))
        );
        CREATE INDEX IF NOT EXISTS idx_notifications_recipient_created_at
            ON notifications(recipient_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_notifications_is_read ON notifications(is_read);

        CREATE TABLE IF NOT EXISTS app_settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )?;

    for (key, value) in DEFAULT_SETTINGS.iter() {
        sqlite_transaction.inner().execute(
            "INSERT OR IGNORE INTO app_settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
    }

    Ok(())
}
