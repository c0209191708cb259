use crate::libs::core::models::{EventKind, UserId};
use crate::libs::storage::records::NotificationEventRecord;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq)]
pub struct SenderEntry {
    pub sender_id: UserId,
    pub is_read: bool,
}

/// A derived, never-persisted collapse of several events into one feed line.
/// `senders` keeps the event-log order and each entry carries its own event's
/// read state.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupedNotification {
    pub representative: NotificationEventRecord,
    pub count: usize,
    pub senders: Vec<SenderEntry>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DisplayNotification {
    Single(NotificationEventRecord),
    Group(GroupedNotification),
}

impl DisplayNotification {
    pub fn created_at(&self) -> i64 {
        match self {
            DisplayNotification::Single(event) => event.created_at,
            DisplayNotification::Group(group) => group.representative.created_at,
        }
    }

    /// A group is unread while any constituent is.
    pub fn is_unread(&self) -> bool {
        match self {
            DisplayNotification::Single(event) => !event.is_read,
            DisplayNotification::Group(group) => {
                group.senders.iter().any(|sender| !sender.is_read)
            }
        }
    }
}

/// Collapses a recipient's raw event log into the display feed.
///
/// Per-kind rules: every `like` folds into one group; `comment`s group per
/// post, with a lone comment passing through as-is; for `message`s only the
/// newest event per sender survives (one chat thread, one line); kinds this
/// build does not recognise pass through untouched. The result is sorted by
/// representative recency, newest first, ties keeping assembly order.
pub fn aggregate_feed(events: Vec<NotificationEventRecord>) -> Vec<DisplayNotification> {
    let mut likes: Vec<NotificationEventRecord> = Vec::new();
    let mut comment_groups: Vec<Vec<NotificationEventRecord>> = Vec::new();
    let mut comment_index: HashMap<Uuid, usize> = HashMap::new();
    let mut latest_messages: Vec<NotificationEventRecord> = Vec::new();
    let mut message_index: HashMap<UserId, usize> = HashMap::new();
    let mut others: Vec<NotificationEventRecord> = Vec::new();

    for event in events {
        match &event.kind {
            EventKind::Like => likes.push(event),
            EventKind::Comment => match comment_index.get(&event.reference_id) {
                Some(&index) => comment_groups[index].push(event),
                None => {
                    comment_index.insert(event.reference_id, comment_groups.len());
                    comment_groups.push(vec![event]);
                }
            },
            EventKind::Message => match message_index.get(&event.sender_id) {
                Some(&index) => {
                    if event.created_at > latest_messages[index].created_at {
                        latest_messages[index] = event;
                    }
                }
                None => {
                    message_index.insert(event.sender_id.clone(), latest_messages.len());
                    latest_messages.push(event);
                }
            },
            EventKind::Other(_) => others.push(event),
        }
    }

    let mut feed: Vec<DisplayNotification> = Vec::new();
    if !likes.is_empty() {
        feed.push(DisplayNotification::Group(group_events(likes)));
    }
    for group in comment_groups {
        if group.len() > 1 {
            feed.push(DisplayNotification::Group(group_events(group)));
        } else if let Some(only) = group.into_iter().next() {
            feed.push(DisplayNotification::Single(only));
        }
    }
    for message in latest_messages {
        feed.push(DisplayNotification::Single(message));
    }
    for other in others {
        feed.push(DisplayNotification::Single(other));
    }

    // sort_by is stable, so equal timestamps keep the assembly order above
    feed.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    feed
}

// Callers guarantee a non-empty group.
fn group_events(events: Vec<NotificationEventRecord>) -> GroupedNotification {
    let mut newest = 0usize;
    for (index, event) in events.iter().enumerate() {
        if event.created_at > events[newest].created_at {
            newest = index;
        }
    }
    let senders = events
        .iter()
        .map(|event| SenderEntry {
            sender_id: event.sender_id.clone(),
            is_read: event.is_read,
        })
        .collect();
    GroupedNotification {
        representative: events[newest].clone(),
        count: events.len(),
        senders,
    }
}

/// Two-phase update backing the mark-read operations: apply the optimistic
/// local transform, then run the persistence call. When persistence fails the
/// optimistic value is worthless, so the state is replaced with a fresh
/// authoritative fetch before the failure is handed back to the caller.
pub fn commit_optimistic<T, E>(
    state: &mut T,
    transform: impl FnOnce(&mut T),
    persist: impl FnOnce() -> Result<(), E>,
    refetch: impl FnOnce() -> Result<T, E>,
) -> Result<(), E> {
    transform(state);
    match persist() {
        Ok(()) => Ok(()),
        Err(err) => {
            *state = refetch()?;
            Err(err)
        }
    }
}

/// Optimistic half of a single-event click: only that event flips.
pub fn mark_event_locally(feed: &mut [DisplayNotification], event_id: &Uuid) {
    for item in feed.iter_mut() {
        if let DisplayNotification::Single(event) = item {
            if event.event_id == *event_id {
                event.is_read = true;
            }
        }
    }
}

/// Optimistic half of a like-group click: every constituent flips.
pub fn mark_like_group_locally(feed: &mut [DisplayNotification]) {
    for item in feed.iter_mut() {
        if let DisplayNotification::Group(group) = item {
            if group.representative.kind == EventKind::Like {
                group.representative.is_read = true;
                for sender in &mut group.senders {
                    sender.is_read = true;
                }
            }
        }
    }
}
