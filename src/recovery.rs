//! Replay of persisted events into a fresh state on entity (re)start.

use crate::behavior::Behavior;
use crate::error::RecoveryError;
use crate::event::{PersistenceId, SequenceNumber};
use crate::journal::Journal;

/// The result of a completed replay: the folded state and the sequence
/// number of the last event applied (0 for an empty history).
pub(crate) struct Recovered<B> {
    pub state: B,
    pub last_seq: SequenceNumber,
}

/// Replay the full journaled history of `id` into a fresh `B`.
///
/// Starts from `B::default()` and folds every `(seq, event)` pair, in
/// order, through [`Behavior::apply`] -- the identical event handler
/// used in live processing, which is what makes the rebuilt state equal
/// to the live state at the same sequence number.
///
/// # Errors
///
/// [`RecoveryError`] when the journal cannot be read. The caller reports
/// this to the supervisor as a start failure, distinct from a processing
/// failure.
pub(crate) async fn replay_into<B: Behavior>(
    journal: &dyn Journal,
    id: &PersistenceId,
) -> Result<Recovered<B>, RecoveryError> {
    let history = journal.replay(id).await?;

    let mut state = B::default();
    let mut last_seq: SequenceNumber = 0;
    for (seq, event) in &history {
        state = state.apply(event);
        last_seq = *seq;
    }

    tracing::debug!(
        persistence_id = %id,
        events = history.len(),
        last_seq,
        "replay complete"
    );

    Ok(Recovered { state, last_seq })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::test_fixtures::Recorder;
    use crate::error::JournalError;
    use crate::event::Event;
    use crate::journal::MemoryJournal;
    use async_trait::async_trait;

    #[tokio::test]
    async fn empty_history_recovers_to_initial_state() {
        let journal = MemoryJournal::new();
        let recovered = replay_into::<Recorder>(&journal, &PersistenceId::new("fresh"))
            .await
            .expect("replay should succeed");

        assert_eq!(recovered.state, Recorder::default());
        assert_eq!(recovered.last_seq, 0);
    }

    #[tokio::test]
    async fn replay_folds_events_in_order() {
        let journal = MemoryJournal::new();
        let id = PersistenceId::new("p-1");
        for n in 1..=4u64 {
            journal
                .append(&id, Event::new(format!("msg{n}")))
                .await
                .expect("append should succeed");
        }

        let recovered = replay_into::<Recorder>(&journal, &id)
            .await
            .expect("replay should succeed");

        assert_eq!(recovered.state.entries, vec!["msg1", "msg2", "msg3", "msg4"]);
        assert_eq!(recovered.last_seq, 4);
    }

    #[tokio::test]
    async fn replay_twice_yields_identical_state() {
        let journal = MemoryJournal::new();
        let id = PersistenceId::new("p-1");
        for n in 1..=10u64 {
            journal
                .append(&id, Event::new(format!("msg{n}")))
                .await
                .expect("append should succeed");
        }

        let first = replay_into::<Recorder>(&journal, &id)
            .await
            .expect("first replay should succeed");
        let second = replay_into::<Recorder>(&journal, &id)
            .await
            .expect("second replay should succeed");

        assert_eq!(first.state, second.state);
        assert_eq!(first.last_seq, second.last_seq);
    }

    /// A journal whose reads always fail, for exercising the recovery
    /// error path.
    struct UnreachableJournal;

    #[async_trait]
    impl Journal for UnreachableJournal {
        async fn append(
            &self,
            _id: &PersistenceId,
            _event: Event,
        ) -> Result<SequenceNumber, JournalError> {
            Err(JournalError::Unavailable("backend down".into()))
        }

        async fn replay(
            &self,
            _id: &PersistenceId,
        ) -> Result<Vec<(SequenceNumber, Event)>, JournalError> {
            Err(JournalError::Unavailable("backend down".into()))
        }
    }

    #[tokio::test]
    async fn unreadable_journal_is_a_recovery_error() {
        let result = replay_into::<Recorder>(&UnreachableJournal, &PersistenceId::new("p-1")).await;
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("recovery failed: journal unavailable: backend down".into())
        );
    }
}
