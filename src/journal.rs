//! Narrow client interface to the external event journal, plus an
//! in-process backend for tests and examples.
//!
//! The journal is an append-only, per-entity-ordered durable log. This
//! core consumes it through [`Journal`] only; no event is ever deleted
//! or mutated through this interface.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::JournalError;
use crate::event::{Event, PersistenceId, SequenceNumber};

/// Client interface to the durable event log.
///
/// Implementations may be shared across many entity instances but must
/// guarantee per-[`PersistenceId`] ordering: sequence numbers for one id
/// are assigned 1, 2, 3, ... with no gaps and no reordering. `append`
/// may take as long as durability requires; the calling entity suspends
/// its command stream until it returns. There is no timeout contract in
/// this core -- a backend that can hang should enforce its own deadline
/// and return [`JournalError::Unavailable`].
#[async_trait]
pub trait Journal: Send + Sync {
    /// Durably append one event for `id`, assigning the next sequence
    /// number for that id.
    ///
    /// # Errors
    ///
    /// [`JournalError::Unavailable`] if the backend cannot be reached or
    /// does not acknowledge; [`JournalError::Full`] if it is out of
    /// space. Either way the event must not have been partially or
    /// silently written.
    async fn append(
        &self,
        id: &PersistenceId,
        event: Event,
    ) -> Result<SequenceNumber, JournalError>;

    /// All previously appended events for `id`, in ascending sequence
    /// order.
    ///
    /// An empty vec for a brand-new id is valid and not an error.
    ///
    /// # Errors
    ///
    /// [`JournalError::Unavailable`] if the backend cannot be read.
    async fn replay(
        &self,
        id: &PersistenceId,
    ) -> Result<Vec<(SequenceNumber, Event)>, JournalError>;
}

/// In-process [`Journal`] backed by a `HashMap` of per-id event vectors.
///
/// Used by this crate's test suite and documentation examples. Cheap to
/// clone; all clones share the same log. An optional per-id capacity
/// makes [`JournalError::Full`] reachable in tests.
///
/// # Examples
///
/// ```
/// use durable_entity::{Event, Journal, MemoryJournal, PersistenceId};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let journal = MemoryJournal::new();
/// let id = PersistenceId::new("p-1");
///
/// let seq = journal.append(&id, Event::new("msg1")).await?;
/// assert_eq!(seq, 1);
/// assert_eq!(journal.replay(&id).await?.len(), 1);
/// # Ok::<(), durable_entity::JournalError>(())
/// # }).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryJournal {
    streams: Arc<Mutex<HashMap<PersistenceId, Vec<Event>>>>,
    capacity: Option<usize>,
}

impl MemoryJournal {
    /// Create an empty journal with unbounded per-id capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty journal that rejects appends with
    /// [`JournalError::Full`] once a stream holds `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            streams: Arc::default(),
            capacity: Some(capacity),
        }
    }

    /// Number of events currently stored for `id`.
    pub fn event_count(&self, id: &PersistenceId) -> usize {
        self.lock().get(id).map_or(0, Vec::len)
    }

    /// Payloads currently stored for `id`, in append order.
    pub fn payloads(&self, id: &PersistenceId) -> Vec<String> {
        self.lock()
            .get(id)
            .map(|events| events.iter().map(|e| e.payload.clone()).collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PersistenceId, Vec<Event>>> {
        self.streams.lock().expect("journal mutex poisoned")
    }
}

#[async_trait]
impl Journal for MemoryJournal {
    async fn append(
        &self,
        id: &PersistenceId,
        event: Event,
    ) -> Result<SequenceNumber, JournalError> {
        let mut streams = self.lock();
        let stream = streams.entry(id.clone()).or_default();
        if let Some(capacity) = self.capacity {
            if stream.len() >= capacity {
                return Err(JournalError::Full);
            }
        }
        stream.push(event);
        Ok(stream.len() as SequenceNumber)
    }

    async fn replay(
        &self,
        id: &PersistenceId,
    ) -> Result<Vec<(SequenceNumber, Event)>, JournalError> {
        let streams = self.lock();
        Ok(streams
            .get(id)
            .map(|events| {
                events
                    .iter()
                    .enumerate()
                    .map(|(i, event)| (i as SequenceNumber + 1, event.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> PersistenceId {
        PersistenceId::new(s)
    }

    #[tokio::test]
    async fn append_assigns_sequence_from_one() {
        let journal = MemoryJournal::new();
        let pid = id("p-1");

        for expected in 1..=5u64 {
            let seq = journal
                .append(&pid, Event::new(format!("msg{expected}")))
                .await
                .expect("append should succeed");
            assert_eq!(seq, expected);
        }
    }

    #[tokio::test]
    async fn replay_returns_events_in_append_order() {
        let journal = MemoryJournal::new();
        let pid = id("p-1");

        for n in 1..=3u64 {
            journal
                .append(&pid, Event::new(format!("msg{n}")))
                .await
                .expect("append should succeed");
        }

        let replayed = journal.replay(&pid).await.expect("replay should succeed");
        let seqs: Vec<u64> = replayed.iter().map(|(seq, _)| *seq).collect();
        let payloads: Vec<&str> = replayed
            .iter()
            .map(|(_, event)| event.payload.as_str())
            .collect();

        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(payloads, vec!["msg1", "msg2", "msg3"]);
    }

    #[tokio::test]
    async fn replay_of_unknown_id_is_empty_not_error() {
        let journal = MemoryJournal::new();
        let replayed = journal
            .replay(&id("never-seen"))
            .await
            .expect("replay of a brand-new id should succeed");
        assert!(replayed.is_empty());
    }

    #[tokio::test]
    async fn streams_are_independent_per_id() {
        let journal = MemoryJournal::new();

        journal
            .append(&id("a"), Event::new("a1"))
            .await
            .expect("append should succeed");
        let seq = journal
            .append(&id("b"), Event::new("b1"))
            .await
            .expect("append should succeed");

        // Each id gets its own sequence starting at 1.
        assert_eq!(seq, 1);
        assert_eq!(journal.event_count(&id("a")), 1);
        assert_eq!(journal.event_count(&id("b")), 1);
    }

    #[tokio::test]
    async fn capacity_reached_returns_full() {
        let journal = MemoryJournal::with_capacity(2);
        let pid = id("p-1");

        journal
            .append(&pid, Event::new("e1"))
            .await
            .expect("append should succeed");
        journal
            .append(&pid, Event::new("e2"))
            .await
            .expect("append should succeed");

        let result = journal.append(&pid, Event::new("e3")).await;
        assert_eq!(result, Err(JournalError::Full));
        // The rejected event was not written.
        assert_eq!(journal.event_count(&pid), 2);
    }

    #[tokio::test]
    async fn clones_share_the_same_log() {
        let journal = MemoryJournal::new();
        let clone = journal.clone();
        let pid = id("p-1");

        clone
            .append(&pid, Event::new("shared"))
            .await
            .expect("append should succeed");

        assert_eq!(journal.payloads(&pid), vec!["shared"]);
    }
}
