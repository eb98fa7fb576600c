//! A single running entity instance and its persist-then-apply command
//! step.
//!
//! One [`Instance`] exists per supervisor attempt. It owns the state,
//! the current sequence number, and the fault-injection parameters; all
//! three are discarded on failure and rebuilt (state and sequence from
//! the journal, parameters from defaults) by the next attempt.

use std::sync::Arc;

use crate::behavior::Behavior;
use crate::command::EntityCommand;
use crate::effect::Effect;
use crate::error::{Failure, RecoveryError};
use crate::event::{PersistenceId, SequenceNumber};
use crate::journal::Journal;
use crate::params::Parameters;
use crate::recovery::{replay_into, Recovered};

/// Observational callback invoked once per completed recovery with the
/// replayed state. Must not emit events; it only sees `&B`.
pub type RecoveryHook<B> = Box<dyn Fn(&B) + Send + Sync>;

/// What the serve loop should do after a successfully processed command.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Keep processing.
    Continue,
    /// `Stop` was received: publish the stopped notification and exit.
    Stop,
}

/// One live instance of an entity: state plus the counters that drive it.
pub(crate) struct Instance<B: Behavior> {
    journal: Arc<dyn Journal>,
    id: PersistenceId,
    state: B,
    last_seq: SequenceNumber,
    params: Parameters,
}

impl<B: Behavior> Instance<B> {
    /// Recover a fresh instance from the journal.
    ///
    /// Resets parameters to defaults, replays the full history, then
    /// invokes the recovery hook (if any) exactly once -- including for
    /// an empty history.
    pub(crate) async fn recover(
        journal: Arc<dyn Journal>,
        id: PersistenceId,
        hook: Option<&RecoveryHook<B>>,
    ) -> Result<Self, RecoveryError> {
        let Recovered { state, last_seq } = replay_into::<B>(journal.as_ref(), &id).await?;

        if let Some(hook) = hook {
            hook(&state);
        }

        Ok(Self {
            journal,
            id,
            state,
            last_seq,
            params: Parameters::default(),
        })
    }

    pub(crate) fn state(&self) -> &B {
        &self.state
    }

    /// Process one command to completion.
    ///
    /// Evaluates the behavior's decision, and for a persist effect:
    /// appends, folds the event into state, advances the sequence
    /// number, then runs the side-effect step. A failed append is an
    /// unhandled failure -- no retry happens here; the supervisor
    /// restarts the instance instead.
    pub(crate) async fn process(
        &mut self,
        cmd: EntityCommand<B::Command>,
    ) -> Result<Flow, Failure> {
        match cmd {
            EntityCommand::Stop => Ok(Flow::Stop),

            EntityCommand::InjectFailureAt(at) => {
                self.params.fail_at = Some(at);
                Ok(Flow::Continue)
            }

            EntityCommand::Command(cmd) => match self.state.handle(cmd) {
                Effect::NoOp => Ok(Flow::Continue),
                Effect::Persist { event, and_then } => {
                    let seq = self.journal.append(&self.id, event.clone()).await?;
                    // Journal contract: next sequence for this id.
                    debug_assert_eq!(seq, self.last_seq + 1);

                    let prior = std::mem::take(&mut self.state);
                    self.state = prior.apply(&event);
                    self.last_seq = seq;
                    self.params.persist_calls += 1;

                    tracing::trace!(
                        persistence_id = %self.id,
                        seq,
                        "event persisted and applied"
                    );

                    // Side-effect step: the event above is already
                    // durable, so an injected failure here is recovered
                    // with that event applied.
                    if self.params.fail_point_reached() {
                        return Err(Failure::Injected {
                            at: self.params.persist_calls,
                        });
                    }
                    if let Some(f) = and_then {
                        f(&self.state);
                    }
                    Ok(Flow::Continue)
                }
            },
        }
    }
}
