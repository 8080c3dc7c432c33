//! Tracing setup and the navigation journal
//!
//! Diagnostics go through `tracing`. The journal is the narrative's own
//! append-only record of processed events, kept in memory and bounded.

use crate::error::JournalError;
use crate::navigation::{NavEvent, Outcome};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "scrolly_narrative=info,scrolly_data=info";

/// Install a global fmt subscriber
///
/// `RUST_LOG` wins over `default_filter`. Returns false if a subscriber was
/// already installed (tests call this repeatedly).
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// One processed navigation event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Assigned on append
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub event: NavEvent,
    pub from: usize,
    pub to: usize,
    pub outcome: Outcome,
}

impl JournalEntry {
    #[must_use]
    pub fn new(event: NavEvent, from: usize, to: usize, outcome: Outcome) -> Self {
        Self {
            seq: 0,
            at: Utc::now(),
            event,
            from,
            to,
            outcome,
        }
    }
}

#[derive(Debug, Default)]
struct JournalInner {
    entries: VecDeque<JournalEntry>,
    next_seq: u64,
}

/// Bounded, append-only log of navigation events
///
/// When full, the oldest entry is dropped; sequence numbers keep counting.
#[derive(Debug)]
pub struct NavigationJournal {
    inner: Mutex<JournalInner>,
    capacity: usize,
}

impl NavigationJournal {
    /// A capacity of zero is treated as one
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(JournalInner::default()),
            capacity: capacity.max(1),
        }
    }

    /// Append, assigning the next sequence number
    pub fn append(&self, mut entry: JournalEntry) -> u64 {
        let mut guard = self.inner.lock();
        entry.seq = guard.next_seq;
        guard.next_seq += 1;
        if guard.entries.len() == self.capacity {
            guard.entries.pop_front();
        }
        guard.entries.push_back(entry);
        guard.next_seq - 1
    }

    /// Snapshot, oldest first
    #[must_use]
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.inner.lock().entries.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total events ever appended
    #[must_use]
    pub fn total_appended(&self) -> u64 {
        self.inner.lock().next_seq
    }

    /// Check that retained entries are consecutive and chain scene to scene
    ///
    /// # Errors
    /// The first gap or discontinuity found.
    pub fn verify(&self) -> Result<(), JournalError> {
        let guard = self.inner.lock();
        let mut previous: Option<&JournalEntry> = None;
        for entry in &guard.entries {
            if let Some(prev) = previous {
                if entry.seq != prev.seq + 1 {
                    return Err(JournalError::SequenceGap {
                        expected: prev.seq + 1,
                        found: entry.seq,
                    });
                }
                if entry.from != prev.to {
                    return Err(JournalError::Discontinuity {
                        seq: entry.seq,
                        from: entry.from,
                        previous_to: prev.to,
                    });
                }
            }
            previous = Some(entry);
        }
        Ok(())
    }
}

impl Default for NavigationJournal {
    fn default() -> Self {
        Self::with_capacity(1024)
    }
}
