use serde::{Deserialize, Serialize};

use crate::libs::core::feed::DisplayNotification;
use crate::libs::core::models::UserId;

/// Wire form of one outbound push, drained by the platform transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushPayload {
    pub recipient_id: String,
    pub sender_id: String,
    pub kind: String,
    pub reference_id: String,
}

impl PushPayload {
    pub fn new(kind: &str, sender: &UserId, recipient: &UserId, reference_id: &str) -> Self {
        Self {
            recipient_id: recipient.uuid.to_string(),
            sender_id: sender.uuid.to_string(),
            kind: kind.to_string(),
            reference_id: reference_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSender {
    pub sender_id: String,
    pub is_read: bool,
}

/// Flattened feed line handed to the UI layer: a single event renders with
/// `count == 1` and one sender, a group carries the whole sender list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub event_id: String,
    pub kind: String,
    pub reference_id: String,
    pub count: usize,
    pub senders: Vec<FeedSender>,
    pub is_unread: bool,
    pub created_at: i64,
}

impl From<&DisplayNotification> for FeedItem {
    fn from(notification: &DisplayNotification) -> Self {
        match notification {
            DisplayNotification::Single(event) => Self {
                event_id: event.event_id.to_string(),
                kind: event.kind.as_tag().to_string(),
                reference_id: event.reference_id.to_string(),
                count: 1,
                senders: vec![FeedSender {
                    sender_id: event.sender_id.uuid.to_string(),
                    is_read: event.is_read,
                }],
                is_unread: !event.is_read,
                created_at: event.created_at,
            },
            DisplayNotification::Group(group) => Self {
                event_id: group.representative.event_id.to_string(),
                kind: group.representative.kind.as_tag().to_string(),
                reference_id: group.representative.reference_id.to_string(),
                count: group.count,
                senders: group
                    .senders
                    .iter()
                    .map(|sender| FeedSender {
                        sender_id: sender.sender_id.uuid.to_string(),
                        is_read: sender.is_read,
                    })
                    .collect(),
                is_unread: notification.is_unread(),
                created_at: group.representative.created_at,
            },
        }
    }
}
