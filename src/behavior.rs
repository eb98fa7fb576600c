//! Behavior trait: the command-decision and event-fold seam.

use crate::effect::Effect;
use crate::event::Event;

/// The pure half of an event-sourced entity.
///
/// The implementing type itself serves as the entity's state, with
/// `Default` supplying the explicit initial state. State is never
/// persisted directly -- it is always the fold of
/// [`apply`](Behavior::apply) over the journaled events, in order,
/// starting from `Self::default()`.
///
/// # Contract
///
/// - [`handle`](Behavior::handle) must be a pure decision function: no
///   I/O, no side effects. It inspects a command against the current
///   state and *describes* the outcome as an [`Effect`]; the command
///   processor executes the description.
/// - [`apply`](Behavior::apply) must be a pure, total function of state
///   and event. Replay feeds it only events that were successfully
///   persisted, so unlike commands, events cannot be rejected.
///
/// Side effects belong in [`Effect::and_then`], which the processor runs
/// exactly once, strictly after the event's append is acknowledged
/// durable.
pub trait Behavior: Default + Clone + Send + Sync + 'static {
    /// The application commands this entity accepts.
    ///
    /// Wrapped by [`EntityCommand`](crate::EntityCommand) on the inbound
    /// surface alongside the core's control commands.
    type Command: Send + 'static;

    /// Decide what one command does to this entity.
    ///
    /// Return [`Effect::none()`] for a command that persists nothing,
    /// or [`Effect::persist`] (optionally with
    /// [`and_then`](Effect::and_then)) to append one event.
    fn handle(&self, cmd: Self::Command) -> Effect<Self>;

    /// Fold a single event into the state, producing the next state.
    ///
    /// The identical function is used during live processing and during
    /// replay; that equivalence is what makes recovery deterministic.
    fn apply(self, event: &Event) -> Self;
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::Behavior;
    use crate::effect::Effect;
    use crate::event::Event;

    /// Test behavior that records every persisted payload in order.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub(crate) struct Recorder {
        pub entries: Vec<String>,
    }

    /// Commands accepted by the [`Recorder`] fixture.
    pub(crate) enum RecorderCommand {
        /// Persist the payload.
        Record(String),
        /// Persist the payload, then bump the counter as a side effect.
        RecordCounted(String, Arc<AtomicUsize>),
        /// Accepted but persists nothing.
        Ignore,
    }

    impl Behavior for Recorder {
        type Command = RecorderCommand;

        fn handle(&self, cmd: Self::Command) -> Effect<Self> {
            match cmd {
                RecorderCommand::Record(payload) => Effect::persist(Event::new(payload)),
                RecorderCommand::RecordCounted(payload, counter) => {
                    Effect::persist(Event::new(payload))
                        .and_then(move |_state: &Recorder| {
                            counter.fetch_add(1, Ordering::SeqCst);
                        })
                }
                RecorderCommand::Ignore => Effect::none(),
            }
        }

        fn apply(mut self, event: &Event) -> Self {
            self.entries.push(event.payload.clone());
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_fixtures::{Recorder, RecorderCommand};
    use super::*;

    #[test]
    fn handle_record_persists_payload() {
        let state = Recorder::default();
        let effect = state.handle(RecorderCommand::Record("msg1".into()));
        match effect {
            Effect::Persist { event, and_then } => {
                assert_eq!(event.payload, "msg1");
                assert!(and_then.is_none());
            }
            Effect::NoOp => panic!("expected Persist"),
        }
    }

    #[test]
    fn handle_ignore_is_noop() {
        let state = Recorder::default();
        assert!(matches!(
            state.handle(RecorderCommand::Ignore),
            Effect::NoOp
        ));
    }

    #[test]
    fn apply_appends_in_order() {
        let state = Recorder::default()
            .apply(&Event::new("a"))
            .apply(&Event::new("b"));
        assert_eq!(state.entries, vec!["a", "b"]);
    }

    #[test]
    fn fold_from_default_matches_manual_state() {
        let events = [Event::new("x"), Event::new("y"), Event::new("z")];
        let folded = events
            .iter()
            .fold(Recorder::default(), |state, event| state.apply(event));
        assert_eq!(folded.entries, vec!["x", "y", "z"]);
    }
}
