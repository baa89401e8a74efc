//! Transient user-facing notices.

use std::time::{Duration, Instant};

use serde::Serialize;

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    #[serde(skip)]
    pub created: Instant,
}

impl Notice {
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created) >= ttl
    }
}

/// Notices in arrival order.
#[derive(Debug, Clone)]
pub struct Notices {
    items: Vec<Notice>,
    next_id: u64,
    ttl: Duration,
}

impl Default for Notices {
    fn default() -> Self {
        Self::with_ttl(NOTICE_TTL)
    }
}

impl Notices {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            ttl,
        }
    }

    /// Add a notice and return its id.
    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Notice {
            id,
            level,
            message: message.into(),
            created: now,
        });
        id
    }

    /// Close a notice early. Returns false if it was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Drop expired notices; returns how many were removed.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.items.len();
        let ttl = self.ttl;
        self.items.retain(|n| !n.is_expired(now, ttl));
        before - self.items.len()
    }

    pub fn active(&self) -> &[Notice] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_expire_after_ttl() {
        let start = Instant::now();
        let mut notices = Notices::default();
        notices.push(NoticeLevel::Error, "boom", start);
        notices.push(NoticeLevel::Success, "ok", start + Duration::from_secs(3));

        assert_eq!(notices.prune(start + Duration::from_millis(4_999)), 0);
        assert_eq!(notices.prune(start + Duration::from_secs(5)), 1);
        assert_eq!(notices.active()[0].message, "ok");
        assert_eq!(notices.prune(start + Duration::from_secs(8)), 1);
        assert!(notices.is_empty());
    }

    #[test]
    fn dismiss_removes_one_notice() {
        let now = Instant::now();
        let mut notices = Notices::default();
        let a = notices.push(NoticeLevel::Info, "a", now);
        let b = notices.push(NoticeLevel::Info, "b", now);

        assert!(notices.dismiss(a));
        assert!(!notices.dismiss(a));
        assert_eq!(notices.active().len(), 1);
        assert_eq!(notices.active()[0].id, b);
    }
}
