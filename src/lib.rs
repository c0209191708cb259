pub mod libs;

use uuid::Uuid;

use crate::libs::core::feed;
use crate::libs::core::matching;
use crate::libs::models::PushPayload;
use crate::libs::push_queue;
use crate::libs::storage::database::database;
use crate::libs::storage::database::database::DATABASE;
use crate::libs::storage::database::storage_sqllite::{SqliteStore, SqliteTransaction};
use crate::libs::storage::database::storage_traits::{
    LikeEdgeStore, NotificationStore, RoomStore, Transactional,
};
use crate::libs::storage::records::{ChatRoomRecord, LikeEdgeRecord};

pub use crate::libs::core::feed::DisplayNotification;
pub use crate::libs::core::matching::{LikeOutcome, MatchError};
pub use crate::libs::core::models::{EventKind, RelationshipState, SessionContext, UserId};
pub use crate::libs::storage::database::storage_traits::StoreError;

/// Opens (or creates) the store at `path` and runs the idempotent schema
/// migration. Call once at app start, before any other operation.
pub fn init_database(path: String) -> Result<(), StoreError> {
    database::initialize_database(path)
}

fn database_pool() -> Result<&'static SqliteStore, StoreError> {
    DATABASE
        .get()
        .ok_or_else(|| StoreError::Initialisation("database not initialised".to_string()))
}

/// Likes `target` on behalf of the session viewer; see
/// [`matching::like`] for the transition rules. The push hand-off happens
/// after commit so a delivery problem can never unwind the mutation.
pub fn like(session: &SessionContext, target: &UserId) -> Result<LikeOutcome, MatchError> {
    let database_pool = database_pool()?;
    let mut connection = database_pool.new_connection()?;

    let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
    let outcome = matching::like(&mut sqlite_transaction, session, target)?;
    sqlite_transaction.commit()?;

    if outcome.notified {
        push_queue::enqueue_push(PushPayload::new(
            "like",
            &session.viewer,
            target,
            &session.viewer.uuid.to_string(),
        ));
    }
    Ok(outcome)
}

/// Withdraws the viewer's like towards `target`. No-op when no edge exists;
/// an existing chat room stays.
pub fn unlike(session: &SessionContext, target: &UserId) -> Result<(), MatchError> {
    let database_pool = database_pool()?;
    let mut connection = database_pool.new_connection()?;

    let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
    matching::unlike(&mut sqlite_transaction, session, target)?;
    sqlite_transaction.commit()?;
    Ok(())
}

/// Accepts an incoming like, guaranteeing the mutual transition and the chat
/// room in the same transaction.
pub fn match_back(session: &SessionContext, target: &UserId) -> Result<LikeOutcome, MatchError> {
    let database_pool = database_pool()?;
    let mut connection = database_pool.new_connection()?;

    let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
    let outcome = matching::match_back(&mut sqlite_transaction, session, target)?;
    sqlite_transaction.commit()?;

    if outcome.notified {
        push_queue::enqueue_push(PushPayload::new(
            "like",
            &session.viewer,
            target,
            &session.viewer.uuid.to_string(),
        ));
    }
    Ok(outcome)
}

/// Declines an incoming like and blocks the pair. Terminal.
pub fn reject(session: &SessionContext, target: &UserId) -> Result<(), MatchError> {
    let database_pool = database_pool()?;
    let mut connection = database_pool.new_connection()?;

    let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
    matching::reject(&mut sqlite_transaction, session, target)?;
    sqlite_transaction.commit()?;
    Ok(())
}

/// Blocks `target` outright, removing both like edges and any chat room.
pub fn block(session: &SessionContext, target: &UserId) -> Result<(), MatchError> {
    let database_pool = database_pool()?;
    let mut connection = database_pool.new_connection()?;

    let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
    matching::block(&mut sqlite_transaction, session, target)?;
    sqlite_transaction.commit()?;
    Ok(())
}

/// Derives the viewer/target relationship state from stored edges.
pub fn relationship_between(
    session: &SessionContext,
    target: &UserId,
) -> Result<RelationshipState, MatchError> {
    let database_pool = database_pool()?;
    let mut connection = database_pool.new_connection()?;

    let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
    let state = matching::relationship_between(&mut sqlite_transaction, session, target)?;
    sqlite_transaction.commit()?;
    Ok(state)
}

/// The "who likes me" list: edges pointing at the viewer, newest first.
pub fn likers_of(session: &SessionContext) -> Result<Vec<LikeEdgeRecord>, MatchError> {
    let database_pool = database_pool()?;
    let mut connection = database_pool.new_connection()?;

    let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
    let likers = sqlite_transaction.load_likers_of(&session.viewer)?;
    sqlite_transaction.commit()?;
    Ok(likers)
}

/// The viewer's chat rooms, newest first.
pub fn rooms_for(session: &SessionContext) -> Result<Vec<ChatRoomRecord>, MatchError> {
    let database_pool = database_pool()?;
    let mut connection = database_pool.new_connection()?;

    let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
    let rooms = sqlite_transaction.load_rooms_for(&session.viewer)?;
    sqlite_transaction.commit()?;
    Ok(rooms)
}

/// Ingestion point for the timeline/chat services: records a `comment`,
/// `message` or future-kind event for `recipient` and queues its push.
/// Returns whether the event was recorded (blocked pairs and
/// self-notifications are dropped).
pub fn record_event(
    kind: EventKind,
    sender: &UserId,
    recipient: &UserId,
    reference_id: Uuid,
) -> Result<bool, MatchError> {
    let database_pool = database_pool()?;
    let mut connection = database_pool.new_connection()?;

    let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
    let recorded = matching::record_event(
        &mut sqlite_transaction,
        kind,
        sender,
        recipient,
        reference_id,
    )?;
    sqlite_transaction.commit()?;

    match recorded {
        Some(event) => {
            push_queue::enqueue_push(PushPayload::new(
                event.kind.as_tag(),
                sender,
                recipient,
                &event.reference_id.to_string(),
            ));
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Loads and aggregates the viewer's notification feed. Recomputed on every
/// call; nothing derived is persisted.
pub fn load_notification_feed(
    session: &SessionContext,
) -> Result<Vec<DisplayNotification>, MatchError> {
    let database_pool = database_pool()?;
    let mut connection = database_pool.new_connection()?;

    let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
    let events = sqlite_transaction.load_events_for(&session.viewer)?;
    sqlite_transaction.commit()?;

    Ok(feed::aggregate_feed(events))
}

/// Unread badge count, over raw events rather than display groups.
pub fn unread_count(session: &SessionContext) -> Result<u64, MatchError> {
    let database_pool = database_pool()?;
    let mut connection = database_pool.new_connection()?;

    let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
    let count = sqlite_transaction.count_unread(&session.viewer)?;
    sqlite_transaction.commit()?;
    Ok(count)
}

/// Marks one event read: the feed is updated optimistically, then the store.
/// On a persistence failure `feed` is replaced with a fresh authoritative
/// load before the error is returned.
pub fn mark_event_read(
    session: &SessionContext,
    feed: &mut Vec<DisplayNotification>,
    event_id: Uuid,
) -> Result<(), MatchError> {
    feed::commit_optimistic(
        feed,
        |items| feed::mark_event_locally(items, &event_id),
        || {
            let database_pool = database_pool()?;
            let mut connection = database_pool.new_connection()?;

            let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
            sqlite_transaction.mark_event_read(&event_id)?;
            sqlite_transaction.commit()?;
            Ok(())
        },
        || load_notification_feed(session),
    )
}

/// Marks the whole like group read, constituent events included. Same
/// optimistic-then-reconcile contract as [`mark_event_read`].
pub fn mark_like_group_read(
    session: &SessionContext,
    feed: &mut Vec<DisplayNotification>,
) -> Result<(), MatchError> {
    feed::commit_optimistic(
        feed,
        |items| feed::mark_like_group_locally(items),
        || {
            let database_pool = database_pool()?;
            let mut connection = database_pool.new_connection()?;

            let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
            sqlite_transaction.mark_kind_read(&session.viewer, &EventKind::Like)?;
            sqlite_transaction.commit()?;
            Ok(())
        },
        || load_notification_feed(session),
    )
}
