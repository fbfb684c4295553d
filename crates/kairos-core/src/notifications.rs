use std::fmt;
use std::time::{Duration, Instant};

/// Lifetime of a notification that is not dismissed by the operator.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);
/// Number of notifications rendered at once; older ones stay queued.
pub const VISIBLE_NOTIFICATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

impl NotificationId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: Instant,
    pub expires_at: Instant,
}

/// Operator notifications in creation order.
///
/// Each record carries its own deadline, so records expire independently and
/// a dismissed record can never expire later.
#[derive(Debug)]
pub struct NotificationQueue {
    entries: Vec<Notification>,
    next_id: u64,
    ttl: Duration,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::with_ttl(NOTIFICATION_TTL)
    }
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            ttl,
        }
    }

    pub fn enqueue(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        now: Instant,
    ) -> Notification {
        self.next_id += 1;
        let notification = Notification {
            id: NotificationId(self.next_id),
            message: message.into(),
            kind,
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.entries.push(notification.clone());
        notification
    }

    /// Removes `id` if still queued. Dismissing twice is a no-op.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Drops every record whose deadline is at or before `now`.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|entry| entry.expires_at).min()
    }

    /// The newest [`VISIBLE_NOTIFICATIONS`] records, oldest first.
    pub fn visible(&self) -> &[Notification] {
        let start = self.entries.len().saturating_sub(VISIBLE_NOTIFICATIONS);
        &self.entries[start..]
    }

    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn undismissed_notifications_expire_after_ttl() {
        let start = Instant::now();
        let mut queue = NotificationQueue::new();
        for message in ["one", "two", "three"] {
            queue.enqueue(message, NotificationKind::Success, start);
        }
        assert_eq!(queue.expire(start + Duration::from_millis(4_999)), 0);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.expire(start + NOTIFICATION_TTL), 3);
        assert!(queue.is_empty());
        assert_eq!(queue.next_deadline(), None);
    }

    #[test]
    fn records_expire_on_their_own_schedule() {
        let start = Instant::now();
        let mut queue = NotificationQueue::new();
        let first = queue.enqueue("first", NotificationKind::Success, start);
        let second = queue.enqueue(
            "second",
            NotificationKind::Failure,
            start + Duration::from_secs(2),
        );

        assert_eq!(queue.next_deadline(), Some(first.expires_at));
        queue.expire(start + Duration::from_secs(5));
        assert!(queue.get(first.id).is_none());
        assert!(queue.get(second.id).is_some());
        assert_eq!(queue.next_deadline(), Some(second.expires_at));
    }

    #[test]
    fn dismissed_notification_never_expires_later() {
        let start = Instant::now();
        let mut queue = NotificationQueue::new();
        let note = queue.enqueue("bye", NotificationKind::Success, start);
        assert!(queue.dismiss(note.id));
        assert!(queue.is_empty());
        assert_eq!(queue.next_deadline(), None);
        assert_eq!(queue.expire(start + Duration::from_secs(10)), 0);
    }

    #[test]
    fn dismiss_is_idempotent() {
        let start = Instant::now();
        let mut queue = NotificationQueue::new();
        let note = queue.enqueue("x", NotificationKind::Success, start);
        let other = queue.enqueue("y", NotificationKind::Success, start);
        assert!(queue.dismiss(note.id));
        assert!(!queue.dismiss(note.id));
        assert_eq!(queue.len(), 1);

        queue.expire(start + NOTIFICATION_TTL);
        assert!(!queue.dismiss(other.id));
    }

    #[test]
    fn ids_are_unique_under_rapid_enqueue() {
        let now = Instant::now();
        let mut queue = NotificationQueue::new();
        let ids: HashSet<NotificationId> = (0..1000)
            .map(|i| queue.enqueue(format!("n{i}"), NotificationKind::Success, now).id)
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let now = Instant::now();
        let mut queue = NotificationQueue::new();
        let first = queue.enqueue("a", NotificationKind::Success, now);
        queue.dismiss(first.id);
        let second = queue.enqueue("b", NotificationKind::Success, now);
        assert!(second.id > first.id);
    }

    #[test]
    fn only_newest_three_are_visible() {
        let start = Instant::now();
        let mut queue = NotificationQueue::new();
        for i in 0..5u64 {
            queue.enqueue(
                format!("m{i}"),
                NotificationKind::Success,
                start + Duration::from_millis(i * 100),
            );
        }
        let visible: Vec<&str> = queue
            .visible()
            .iter()
            .map(|note| note.message.as_str())
            .collect();
        assert_eq!(visible, vec!["m2", "m3", "m4"]);
        assert_eq!(queue.len(), 5);

        // Hidden records still expire while out of view.
        queue.expire(start + Duration::from_millis(5_150));
        assert_eq!(queue.len(), 3);
        let visible: Vec<&str> = queue
            .visible()
            .iter()
            .map(|note| note.message.as_str())
            .collect();
        assert_eq!(visible, vec!["m2", "m3", "m4"]);
    }

    #[test]
    fn fewer_than_limit_are_all_visible() {
        let now = Instant::now();
        let mut queue = NotificationQueue::new();
        assert!(queue.visible().is_empty());
        queue.enqueue("only", NotificationKind::Failure, now);
        assert_eq!(queue.visible().len(), 1);
    }
}
