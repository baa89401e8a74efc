//! Request tickets: last-issued-wins ordering for overlapping requests.
//!
//! Every request takes a [`Ticket`] before it is sent. When the response
//! arrives it is applied only if its ticket is still the newest one issued
//! for that kind; an older response that lands late is dropped.

use std::collections::BTreeMap;

use serde::Serialize;

/// What a request is for. Kinds are tracked independently, so a slow
/// saved-filter listing never invalidates a record fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Records,
    SavedFilters,
}

/// Identifies one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    kind: RequestKind,
    seq: u64,
}

impl Ticket {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Issues tickets and remembers the newest one per kind.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: BTreeMap<RequestKind, u64>,
}

impl RequestTracker {
    /// Issue a new ticket, superseding every earlier ticket of the same kind.
    pub fn issue(&mut self, kind: RequestKind) -> Ticket {
        let seq = self.latest.entry(kind).or_insert(0);
        *seq += 1;
        Ticket { kind, seq: *seq }
    }

    /// Whether `ticket` is still the newest of its kind.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.get(&ticket.kind) == Some(&ticket.seq)
    }

    /// Invalidate every outstanding ticket.
    pub fn cancel_all(&mut self) {
        for seq in self.latest.values_mut() {
            *seq += 1;
        }
    }
}
