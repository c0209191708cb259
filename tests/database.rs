mod common;

use crate::common::*;
use std::sync::Once;
use uuid::Uuid;

use ember_match_lib::libs::storage::database::database::{apply_schema, DATABASE};
use ember_match_lib::libs::storage::database::storage_sqllite::{SqliteStore, SqliteTransaction};
use ember_match_lib::libs::storage::database::storage_traits::{
    BlockStore, LikeEdgeStore, NotificationStore, RoomStore, Transactional,
};
use ember_match_lib::libs::storage::records::{
    BlockRecord, ChatRoomRecord, LikeEdgeRecord, NotificationEventRecord,
};
use ember_match_lib::EventKind;

static TEST_DIR: &str = "./tests/test_db_dir";
static INIT: Once = Once::new();

#[test]
pub fn aaa_db_initalisation() {
    init_test_db(&INIT, TEST_DIR, "database");
}

#[test]
fn schema_applies_to_fresh_file_twice() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("schema_check.db");
    let store =
        SqliteStore::new(db_path.to_str().expect("temp path not utf-8")).expect("Failed to open store");

    let mut connection = store.new_connection().expect("Failed to get connection");

    // Running the migration twice must be harmless.
    let sqlite_transaction =
        SqliteTransaction::new(&mut connection).expect("Failed to create SQLITE TRANSACTION");
    apply_schema(&sqlite_transaction).expect("First migration failed");
    apply_schema(&sqlite_transaction).expect("Second migration failed");

    let tables: i64 = sqlite_transaction
        .inner()
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
             AND name IN ('like_edges', 'blocks', 'chat_rooms', 'notifications', 'app_settings')",
            [],
            |row| row.get(0),
        )
        .expect("Failed to count tables");
    assert_eq!(tables, 5);

    sqlite_transaction.commit().expect("Failed to commit");
}

#[test]
fn like_edge_insert_is_idempotent() {
    init_test_db(&INIT, TEST_DIR, "database");
    let database_pool = DATABASE.get().expect("Database not initialised");
    let mut connection = database_pool
        .new_connection()
        .expect("Failed to get connection");

    let liker = fresh_user();
    let liked = fresh_user();

    let mut tx_1 =
        SqliteTransaction::new(&mut connection).expect("Failed to create SQLITE TRANSACTION");
    assert!(tx_1
        .insert_like_edge(&LikeEdgeRecord::new(liker.clone(), liked.clone()))
        .expect("Failed to insert edge"));
    // A second row for the same ordered pair is swallowed by the uniqueness
    // constraint and reported as not-new.
    assert!(!tx_1
        .insert_like_edge(&LikeEdgeRecord::new(liker.clone(), liked.clone()))
        .expect("Failed to re-insert edge"));
    tx_1.commit().expect("Failed to commit");

    let mut tx_2 =
        SqliteTransaction::new(&mut connection).expect("Failed to create SQLITE TRANSACTION");
    assert!(tx_2
        .like_edge_exists(&liker, &liked)
        .expect("Failed to check edge"));
    assert!(!tx_2
        .like_edge_exists(&liked, &liker)
        .expect("Failed to check reverse edge"));

    assert!(tx_2
        .delete_like_edge(&liker, &liked)
        .expect("Failed to delete edge"));
    assert!(!tx_2
        .delete_like_edge(&liker, &liked)
        .expect("Failed to re-delete edge"));
    tx_2.commit().expect("Failed to commit");
}

#[test]
fn block_row_is_order_independent() {
    init_test_db(&INIT, TEST_DIR, "database");
    let database_pool = DATABASE.get().expect("Database not initialised");
    let mut connection = database_pool
        .new_connection()
        .expect("Failed to get connection");

    let a = fresh_user();
    let b = fresh_user();

    let mut tx =
        SqliteTransaction::new(&mut connection).expect("Failed to create SQLITE TRANSACTION");
    assert!(tx
        .insert_block(&BlockRecord::new(&a, &b))
        .expect("Failed to insert block"));
    assert!(!tx
        .insert_block(&BlockRecord::new(&b, &a))
        .expect("Failed to re-insert block"));

    assert!(tx.block_exists(&a, &b).expect("Failed to check block"));
    assert!(tx.block_exists(&b, &a).expect("Failed to check block"));
    tx.commit().expect("Failed to commit");
}

#[test]
fn room_is_unique_per_pair() {
    init_test_db(&INIT, TEST_DIR, "database");
    let database_pool = DATABASE.get().expect("Database not initialised");
    let mut connection = database_pool
        .new_connection()
        .expect("Failed to get connection");

    let a = fresh_user();
    let b = fresh_user();

    let mut tx =
        SqliteTransaction::new(&mut connection).expect("Failed to create SQLITE TRANSACTION");
    assert!(tx
        .insert_room(&ChatRoomRecord::new(&a, &b))
        .expect("Failed to insert room"));
    assert!(!tx
        .insert_room(&ChatRoomRecord::new(&b, &a))
        .expect("Failed to re-insert room"));

    let room_ab = tx
        .load_room(&a, &b)
        .expect("Failed to load room")
        .expect("Room missing");
    let room_ba = tx
        .load_room(&b, &a)
        .expect("Failed to load room")
        .expect("Room missing");
    assert_eq!(room_ab.room_id, room_ba.room_id);
    assert!(room_ab.user_low.uuid <= room_ab.user_high.uuid);

    assert!(tx.delete_room(&b, &a).expect("Failed to delete room"));
    assert!(tx
        .load_room(&a, &b)
        .expect("Failed to load room")
        .is_none());
    tx.commit().expect("Failed to commit");
}

#[test]
fn event_round_trip_preserves_unknown_kind() {
    init_test_db(&INIT, TEST_DIR, "database");
    let database_pool = DATABASE.get().expect("Database not initialised");
    let mut connection = database_pool
        .new_connection()
        .expect("Failed to get connection");

    let sender = fresh_user();
    let recipient = fresh_user();
    let reference = Uuid::now_v7();

    let event = NotificationEventRecord::new(
        EventKind::Other("boost".to_string()),
        sender.clone(),
        recipient.clone(),
        reference,
    );

    let mut tx_1 =
        SqliteTransaction::new(&mut connection).expect("Failed to create SQLITE TRANSACTION");
    tx_1.insert_event(&event).expect("Failed to insert event");
    tx_1.commit().expect("Failed to commit");

    let mut tx_2 =
        SqliteTransaction::new(&mut connection).expect("Failed to create SQLITE TRANSACTION");
    let events = tx_2
        .load_events_for(&recipient)
        .expect("Failed to load events");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Other("boost".to_string()));
    assert_eq!(events[0].reference_id, reference);
    assert!(!events[0].is_read);
    assert_eq!(
        tx_2.count_unread(&recipient).expect("Failed to count"),
        1
    );

    assert!(tx_2
        .mark_event_read(&event.event_id)
        .expect("Failed to mark read"));
    assert_eq!(
        tx_2.count_unread(&recipient).expect("Failed to count"),
        0
    );
    tx_2.commit().expect("Failed to commit");
}

#[test]
fn mark_kind_read_only_touches_that_kind() {
    init_test_db(&INIT, TEST_DIR, "database");
    let database_pool = DATABASE.get().expect("Database not initialised");
    let mut connection = database_pool
        .new_connection()
        .expect("Failed to get connection");

    let recipient = fresh_user();

    let mut tx =
        SqliteTransaction::new(&mut connection).expect("Failed to create SQLITE TRANSACTION");
    for _ in 0..3 {
        tx.insert_event(&NotificationEventRecord::new(
            EventKind::Like,
            fresh_user(),
            recipient.clone(),
            Uuid::now_v7(),
        ))
        .expect("Failed to insert like event");
    }
    tx.insert_event(&NotificationEventRecord::new(
        EventKind::Comment,
        fresh_user(),
        recipient.clone(),
        Uuid::now_v7(),
    ))
    .expect("Failed to insert comment event");

    let updated = tx
        .mark_kind_read(&recipient, &EventKind::Like)
        .expect("Failed to mark likes read");
    assert_eq!(updated, 3);
    assert_eq!(tx.count_unread(&recipient).expect("Failed to count"), 1);
    tx.commit().expect("Failed to commit");
}
