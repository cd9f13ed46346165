//!
//! This module decides whether a completed request may still be applied to view state.
//!
//! Each request is issued a ticket carrying a monotonically increasing sequence number. For any logical query key,
//! only the most recently issued ticket is current: results are ordered by issue, never by arrival. Tearing the view
//! down invalidates every outstanding ticket.
//!
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Identity of a logical resource. Requests sharing a key supersede each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn queues() -> Self {
        QueryKey("queues".to_owned())
    }

    pub fn queue_info(queue_id: &str) -> Self {
        QueryKey(format!("queue:{}", queue_id))
    }

    /// The message feed of a queue, across all offsets and page sizes.
    pub fn messages(queue_id: &str) -> Self {
        QueryKey(format!("messages:{}", queue_id))
    }

    pub fn topics() -> Self {
        QueryKey("topics".to_owned())
    }

    pub fn consumer_groups() -> Self {
        QueryKey("consumer-groups".to_owned())
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: QueryKey,
    sequence: u64,
    epoch: u64,
}

impl Ticket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    next: AtomicU64,

    /// Bumped on teardown; tickets from an older epoch are never current.
    epoch: AtomicU64,

    latest: Mutex<HashMap<QueryKey, u64>>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_sequence(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Issue a ticket for `key`, superseding every ticket issued for it before.
    pub fn issue(&self, key: QueryKey) -> Ticket {
        let sequence = self.next_sequence();
        let epoch = self.epoch.load(Ordering::Acquire);
        match self.latest.lock() {
            Ok(mut latest) => {
                latest.insert(key.clone(), sequence);
            }
            Err(e) => {
                tracing::error!("Request sequence table is poisoned. Cause: {}", e);
            }
        }
        Ticket {
            key,
            sequence,
            epoch,
        }
    }

    /// Whether a result obtained under `ticket` may still be applied.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        if ticket.epoch != self.epoch.load(Ordering::Acquire) {
            return false;
        }
        match self.latest.lock() {
            Ok(latest) => latest.get(&ticket.key) == Some(&ticket.sequence),
            Err(e) => {
                tracing::error!("Request sequence table is poisoned. Cause: {}", e);
                false
            }
        }
    }

    /// Invalidate every outstanding ticket, as when the owning view is torn down.
    pub fn cancel_all(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        match self.latest.lock() {
            Ok(mut latest) => latest.clear(),
            Err(e) => {
                tracing::error!("Request sequence table is poisoned. Cause: {}", e);
            }
        }
    }
}
