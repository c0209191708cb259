use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserId {
    pub uuid: Uuid,
}

impl From<[u8; 16]> for UserId {
    fn from(bytes: [u8; 16]) -> UserId {
        Self {
            uuid: Uuid::from_bytes(bytes),
        }
    }
}

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> UserId {
        Self { uuid }
    }
}

impl ToSql for UserId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.uuid.to_string()))
    }
}

impl FromSql for UserId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let uuid_str = value.as_str()?;
        Uuid::parse_str(uuid_str)
            .map(|uuid| UserId { uuid })
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// The authenticated viewer, resolved by the profile/identity service and
/// handed to every operation. No ambient session state exists in this crate.
#[derive(Clone, Debug)]
pub struct SessionContext {
    pub viewer: UserId,
}

impl SessionContext {
    pub fn new(viewer: UserId) -> Self {
        Self { viewer }
    }
}

/// An unordered pair in canonical form: `user_low` sorts before `user_high`.
/// Blocks and chat rooms key on this so a pair maps to at most one row no
/// matter which side initiated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairKey {
    pub user_low: UserId,
    pub user_high: UserId,
}

impl PairKey {
    // uuid byte order matches the canonical text form stored in sqlite, so
    // the CHECK(user_low < user_high) constraint agrees with this ordering
    pub fn normalised(a: &UserId, b: &UserId) -> Self {
        if a.uuid <= b.uuid {
            Self {
                user_low: a.clone(),
                user_high: b.clone(),
            }
        } else {
            Self {
                user_low: b.clone(),
                user_high: a.clone(),
            }
        }
    }
}

/// Relationship state of a pair, seen from the viewer's side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationshipState {
    Stranger,
    PendingOutgoing,
    PendingIncoming,
    Mutual,
    Blocked,
}

/// Notification event kinds. The stored tag set is open: tags this build does
/// not know are carried through `Other` so newer app versions' events survive
/// a round trip instead of failing the feed load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    Like,
    Comment,
    Message,
    Other(String),
}

impl EventKind {
    pub fn as_tag(&self) -> &str {
        match self {
            EventKind::Like => "like",
            EventKind::Comment => "comment",
            EventKind::Message => "message",
            EventKind::Other(tag) => tag,
        }
    }
}

impl FromSql for EventKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let kind = value.as_str()?;
        match kind {
            "like" => Ok(EventKind::Like),
            "comment" => Ok(EventKind::Comment),
            "message" => Ok(EventKind::Message),
            other => Ok(EventKind::Other(other.to_string())),
        }
    }
}

impl ToSql for EventKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            EventKind::Like => Ok(ToSqlOutput::from("like")),
            EventKind::Comment => Ok(ToSqlOutput::from("comment")),
            EventKind::Message => Ok(ToSqlOutput::from("message")),
            EventKind::Other(tag) => Ok(ToSqlOutput::from(tag.clone())),
        }
    }
}
