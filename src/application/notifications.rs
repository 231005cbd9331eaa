//! Short-lived toast notifications.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

const MAX_STORED: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    /// Explorer link for transaction outcomes
    pub link: Option<String>,
    pub created: Instant,
}

/// Toasts ordered oldest first, each expiring `ttl` after it was pushed.
#[derive(Debug)]
pub struct Notifications {
    items: VecDeque<Notification>,
    ttl: Duration,
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            ttl,
        }
    }

    pub fn push(&mut self, level: Level, message: String, link: Option<String>) {
        self.push_at(level, message, link, Instant::now());
    }

    pub fn push_at(&mut self, level: Level, message: String, link: Option<String>, created: Instant) {
        self.items.push_back(Notification {
            level,
            message,
            link,
            created,
        });
        while self.items.len() > MAX_STORED {
            self.items.pop_front();
        }
    }

    /// Drops every toast older than the TTL.
    pub fn prune(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|n| now.saturating_duration_since(n.created) < ttl);
    }

    /// Up to `max` toasts, newest first.
    pub fn visible(&self, max: usize) -> impl Iterator<Item = &Notification> {
        self.items.iter().rev().take(max)
    }

    pub fn last(&self) -> Option<&Notification> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, level: Level) -> usize {
        self.items.iter().filter(|n| n.level == level).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_expired() {
        let mut toasts = Notifications::new(Duration::from_secs(5));
        let start = Instant::now();
        toasts.push_at(Level::Info, "old".into(), None, start);
        toasts.push_at(Level::Error, "new".into(), None, start + Duration::from_secs(4));

        toasts.prune(start + Duration::from_secs(6));
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts.last().unwrap().message, "new");
    }

    #[test]
    fn test_visible_newest_first() {
        let mut toasts = Notifications::new(Duration::from_secs(5));
        for i in 0..5 {
            toasts.push(Level::Success, format!("t{i}"), None);
        }
        let shown: Vec<_> = toasts.visible(3).map(|n| n.message.as_str()).collect();
        assert_eq!(shown, vec!["t4", "t3", "t2"]);
        assert_eq!(toasts.count(Level::Success), 5);
    }

    #[test]
    fn test_storage_is_bounded() {
        let mut toasts = Notifications::new(Duration::from_secs(60));
        for i in 0..(MAX_STORED + 10) {
            toasts.push(Level::Info, i.to_string(), None);
        }
        assert_eq!(toasts.len(), MAX_STORED);
        // oldest survivor
        assert_eq!(toasts.visible(MAX_STORED).last().unwrap().message, "10");
    }
}
