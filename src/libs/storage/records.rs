use crate::libs::core::models::{EventKind, PairKey, UserId};
use chrono::Utc;
use uuid::Uuid;

/// One directed "like" edge. At most one row exists per ordered pair, which
/// the store enforces with a uniqueness constraint.
#[derive(Clone, Debug, PartialEq)]
pub struct LikeEdgeRecord {
    pub edge_id: Uuid,
    pub liker_id: UserId,
    pub liked_id: UserId,
    pub created_at: i64,
}

impl LikeEdgeRecord {
    pub fn new(liker_id: UserId, liked_id: UserId) -> Self {
        Self {
            edge_id: Uuid::now_v7(),
            liker_id,
            liked_id,
            created_at: Utc::now().timestamp(),
        }
    }

    pub fn from_db(edge_id: Uuid, liker_id: UserId, liked_id: UserId, created_at: i64) -> Self {
        Self {
            edge_id,
            liker_id,
            liked_id,
            created_at,
        }
    }
}

/// Symmetric block between two users, stored in canonical pair order. A block
/// row supersedes any like edges between the pair.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockRecord {
    pub block_id: Uuid,
    pub user_low: UserId,
    pub user_high: UserId,
    pub created_at: i64,
}

impl BlockRecord {
    pub fn new(a: &UserId, b: &UserId) -> Self {
        let pair = PairKey::normalised(a, b);
        Self {
            block_id: Uuid::now_v7(),
            user_low: pair.user_low,
            user_high: pair.user_high,
            created_at: Utc::now().timestamp(),
        }
    }

    pub fn from_db(block_id: Uuid, user_low: UserId, user_high: UserId, created_at: i64) -> Self {
        Self {
            block_id,
            user_low,
            user_high,
            created_at,
        }
    }
}

/// The messaging channel for a matched pair, stored in canonical pair order
/// so a pair has at most one room regardless of which side completed the
/// match.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatRoomRecord {
    pub room_id: Uuid,
    pub user_low: UserId,
    pub user_high: UserId,
    pub created_at: i64,
}

impl ChatRoomRecord {
    pub fn new(a: &UserId, b: &UserId) -> Self {
        let pair = PairKey::normalised(a, b);
        Self {
            room_id: Uuid::now_v7(),
            user_low: pair.user_low,
            user_high: pair.user_high,
            created_at: Utc::now().timestamp(),
        }
    }

    pub fn from_db(room_id: Uuid, user_low: UserId, user_high: UserId, created_at: i64) -> Self {
        Self {
            room_id,
            user_low,
            user_high,
            created_at,
        }
    }
}

/// A single recorded occurrence destined for one recipient's feed.
///
/// `reference_id` points at the liker for `like`, the post for `comment` and
/// the chat room for `message`. Rows are only ever mutated by flipping
/// `is_read`; retention is the embedding app's concern.
#[derive(Clone, Debug, PartialEq)]
pub struct NotificationEventRecord {
    pub event_id: Uuid,
    pub kind: EventKind,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub reference_id: Uuid,
    pub is_read: bool,
    pub created_at: i64,
}

impl NotificationEventRecord {
    pub fn new(kind: EventKind, sender_id: UserId, recipient_id: UserId, reference_id: Uuid) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            kind,
            sender_id,
            recipient_id,
            reference_id,
            is_read: false,
            created_at: Utc::now().timestamp(),
        }
    }

    pub fn from_db(
        event_id: Uuid,
        kind: EventKind,
        sender_id: UserId,
        recipient_id: UserId,
        reference_id: Uuid,
        is_read: bool,
        created_at: i64,
    ) -> Self {
        Self {
            event_id,
            kind,
            sender_id,
            recipient_id,
            reference_id,
            is_read,
            created_at,
        }
    }
}
