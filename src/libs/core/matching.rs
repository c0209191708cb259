use crate::libs::core::models::{EventKind, RelationshipState, SessionContext, UserId};
use crate::libs::storage::database::storage_traits::{RelationStore, StoreError};
use crate::libs::storage::records::{BlockRecord, ChatRoomRecord, LikeEdgeRecord, NotificationEventRecord};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a mutating operation left behind, so the caller can refresh its view
/// without a second round trip. The store stays authoritative: the other side
/// may have changed the pair concurrently, so callers re-derive state rather
/// than caching this long-term.
#[derive(Clone, Debug, PartialEq)]
pub struct LikeOutcome {
    pub state: RelationshipState,
    pub room_id: Option<Uuid>,
    /// A `like` event was recorded and is awaiting push hand-off.
    pub notified: bool,
}

/// Records a like from the viewer towards `target`.
///
/// Order of checks matters: self-like is rejected outright, a blocked pair is
/// a silent no-op (the UI should have hidden the action, this re-validates),
/// and the edge insert itself is idempotent. The `like` notification is
/// emitted only when the edge is new, so repeating the action can never
/// duplicate it. If the reverse edge already exists the pair becomes mutual
/// and the chat room is created, exactly once per pair.
pub fn like<S: RelationStore>(
    store: &mut S,
    session: &SessionContext,
    target: &UserId,
) -> Result<LikeOutcome, MatchError> {
    let viewer = &session.viewer;
    if viewer == target {
        return Err(MatchError::InvalidOperation("cannot like yourself"));
    }
    if store.block_exists(viewer, target)? {
        return Ok(LikeOutcome {
            state: RelationshipState::Blocked,
            room_id: None,
            notified: false,
        });
    }

    let edge = LikeEdgeRecord::new(viewer.clone(), target.clone());
    let inserted = store.insert_like_edge(&edge)?;

    if inserted {
        let event = NotificationEventRecord::new(
            EventKind::Like,
            viewer.clone(),
            target.clone(),
            viewer.uuid,
        );
        store.insert_event(&event)?;
    }

    if store.like_edge_exists(target, viewer)? {
        let room = ChatRoomRecord::new(viewer, target);
        store.insert_room(&room)?;
        // Load rather than trust our candidate row: the pair may already have
        // had a room from an earlier match.
        let room_id = store.load_room(viewer, target)?.map(|r| r.room_id);
        debug!(viewer = %viewer.uuid, target = %target.uuid, "pair reached mutual state");
        Ok(LikeOutcome {
            state: RelationshipState::Mutual,
            room_id,
            notified: inserted,
        })
    } else {
        Ok(LikeOutcome {
            state: RelationshipState::PendingOutgoing,
            room_id: None,
            notified: inserted,
        })
    }
}

/// Removes the viewer's like towards `target`. Silently a no-op when no edge
/// exists. An existing chat room is left in place: dissolving a match is the
/// business of `reject`/`block`, and room creation is idempotent if the pair
/// matches again.
pub fn unlike<S: RelationStore>(
    store: &mut S,
    session: &SessionContext,
    target: &UserId,
) -> Result<(), MatchError> {
    store.delete_like_edge(&session.viewer, target)?;
    Ok(())
}

/// Accepts an incoming like: `like` with the guarantee that the pair ends up
/// mutual. A missing incoming edge means the caller's view is stale.
pub fn match_back<S: RelationStore>(
    store: &mut S,
    session: &SessionContext,
    target: &UserId,
) -> Result<LikeOutcome, MatchError> {
    let viewer = &session.viewer;
    if viewer == target {
        return Err(MatchError::InvalidOperation("cannot match yourself"));
    }
    if !store.like_edge_exists(target, viewer)? {
        return Err(MatchError::InvalidOperation("no incoming like to match"));
    }
    like(store, session, target)
}

/// Declines an incoming like. Valid only while the viewer is the liked-but-
/// not-reciprocating side: the incoming edge goes away, any room with the
/// pair goes away, and a block makes the decision terminal.
pub fn reject<S: RelationStore>(
    store: &mut S,
    session: &SessionContext,
    target: &UserId,
) -> Result<(), MatchError> {
    let viewer = &session.viewer;
    if viewer == target {
        return Err(MatchError::InvalidOperation("cannot reject yourself"));
    }

    let incoming = store.like_edge_exists(target, viewer)?;
    let outgoing = store.like_edge_exists(viewer, target)?;
    if !incoming || outgoing {
        return Err(MatchError::InvalidOperation(
            "reject requires an unanswered incoming like",
        ));
    }

    store.delete_like_edge(target, viewer)?;
    store.delete_room(viewer, target)?;
    store.insert_block(&BlockRecord::new(viewer, target))?;
    debug!(viewer = %viewer.uuid, target = %target.uuid, "incoming like rejected, pair blocked");
    Ok(())
}

/// Blocks `target` outright, regardless of current state: both edges and any
/// chat room are removed. Terminal until an out-of-band moderation path lifts
/// the block.
pub fn block<S: RelationStore>(
    store: &mut S,
    session: &SessionContext,
    target: &UserId,
) -> Result<(), MatchError> {
    let viewer = &session.viewer;
    if viewer == target {
        return Err(MatchError::InvalidOperation("cannot block yourself"));
    }

    store.insert_block(&BlockRecord::new(viewer, target))?;
    store.delete_like_edge(viewer, target)?;
    store.delete_like_edge(target, viewer)?;
    store.delete_room(viewer, target)?;
    debug!(viewer = %viewer.uuid, target = %target.uuid, "pair blocked");
    Ok(())
}

/// Derives the pair's state from stored edges, viewer side first. A block
/// supersedes whatever edges remain.
pub fn relationship_between<S: RelationStore>(
    store: &mut S,
    session: &SessionContext,
    target: &UserId,
) -> Result<RelationshipState, MatchError> {
    let viewer = &session.viewer;
    if store.block_exists(viewer, target)? {
        return Ok(RelationshipState::Blocked);
    }

    let outgoing = store.like_edge_exists(viewer, target)?;
    let incoming = store.like_edge_exists(target, viewer)?;
    Ok(match (outgoing, incoming) {
        (true, true) => RelationshipState::Mutual,
        (true, false) => RelationshipState::PendingOutgoing,
        (false, true) => RelationshipState::PendingIncoming,
        (false, false) => RelationshipState::Stranger,
    })
}

/// Ingestion point for events minted outside the evaluator (comments from the
/// timeline service, messages from the chat service). Events between blocked
/// pairs and self-notifications are dropped, mirroring the evaluator's own
/// re-validation. Returns the stored record so the caller can hand a payload
/// to the push queue after commit.
pub fn record_event<S: RelationStore>(
    store: &mut S,
    kind: EventKind,
    sender: &UserId,
    recipient: &UserId,
    reference_id: Uuid,
) -> Result<Option<NotificationEventRecord>, MatchError> {
    if sender == recipient {
        return Ok(None);
    }
    if store.block_exists(sender, recipient)? {
        return Ok(None);
    }

    let event = NotificationEventRecord::new(kind, sender.clone(), recipient.clone(), reference_id);
    store.insert_event(&event)?;
    Ok(Some(event))
}
