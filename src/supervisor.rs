//! Restart supervision: the loop that owns one entity's mailbox and
//! keeps a live instance in front of it.
//!
//! The lifecycle is an explicit phase machine:
//!
//! ```text
//! Recovering -> Ready -> (Failed) -> Recovering -> ...
//! ```
//!
//! Any unhandled [`Failure`] -- from recovery or from processing --
//! transitions back to `Recovering` with a fresh instance for the same
//! [`PersistenceId`](crate::PersistenceId). Restart is unconditional: no
//! backoff, no attempt cap. In-memory state and fault-injection
//! parameters are discarded; only journaled events survive, and the new
//! instance reconstructs from them. A persistently unreachable journal
//! therefore crash-loops; every restart is logged at `warn` with a
//! running count so the condition is externally observable rather than
//! silently masked.
//!
//! The mailbox outlives instances: commands queued behind a failure are
//! delivered to the next instance, after its recovery completes.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use crate::behavior::Behavior;
use crate::command::EntityCommand;
use crate::error::Failure;
use crate::event::PersistenceId;
use crate::journal::Journal;
use crate::processor::{Flow, Instance, RecoveryHook};

/// Messages carried by an entity's mailbox.
///
/// `Command` is the inbound command surface; `GetState` is the handle's
/// observation query, answered with a clone of the current state.
pub(crate) enum Envelope<B: Behavior> {
    Command(EntityCommand<B::Command>),
    GetState { reply: oneshot::Sender<B> },
}

/// Supervisor phase for one entity.
enum Phase<B: Behavior> {
    /// Replaying the journal into a fresh instance.
    Recovering,
    /// Serving commands with a live instance.
    Ready(Box<Instance<B>>),
    /// An unhandled failure occurred; about to restart.
    Failed(Failure),
}

/// Why the serve loop returned.
enum Served {
    /// `Stop` was processed; terminate and notify observers.
    Stopped,
    /// Every handle was dropped; terminate quietly.
    Disconnected,
    /// An unhandled failure; the supervisor restarts.
    Failed(Failure),
}

/// Drive one entity until it stops or its last handle is dropped.
///
/// Owns the receiving end of the mailbox across restarts.
pub(crate) async fn run_supervisor<B: Behavior>(
    journal: Arc<dyn Journal>,
    id: PersistenceId,
    hook: Option<RecoveryHook<B>>,
    mut rx: mpsc::Receiver<Envelope<B>>,
    stopped_tx: watch::Sender<bool>,
) {
    let mut restarts: u64 = 0;
    let mut phase: Phase<B> = Phase::Recovering;

    loop {
        phase = match phase {
            Phase::Recovering => {
                match Instance::recover(Arc::clone(&journal), id.clone(), hook.as_ref()).await {
                    Ok(instance) => {
                        tracing::debug!(persistence_id = %id, "entity ready");
                        Phase::Ready(Box::new(instance))
                    }
                    Err(e) => Phase::Failed(e.into()),
                }
            }

            Phase::Ready(mut instance) => match serve(&mut instance, &mut rx).await {
                Served::Stopped => {
                    tracing::info!(persistence_id = %id, "entity stopped");
                    // Observers awaiting `stopped()` resolve here. Send
                    // can only fail if nobody is watching.
                    let _ = stopped_tx.send(true);
                    return;
                }
                Served::Disconnected => {
                    tracing::debug!(persistence_id = %id, "all handles dropped, exiting");
                    return;
                }
                Served::Failed(failure) => Phase::Failed(failure),
            },

            Phase::Failed(failure) => {
                restarts += 1;
                tracing::warn!(
                    persistence_id = %id,
                    restarts,
                    error = %failure,
                    "entity failed, restarting"
                );
                Phase::Recovering
            }
        };
    }
}

/// Process envelopes one at a time until stop, disconnect, or failure.
///
/// A pending `append` inside [`Instance::process`] suspends this loop,
/// so no other command for the entity runs concurrently with it.
async fn serve<B: Behavior>(
    instance: &mut Instance<B>,
    rx: &mut mpsc::Receiver<Envelope<B>>,
) -> Served {
    while let Some(envelope) = rx.recv().await {
        match envelope {
            Envelope::GetState { reply } => {
                // A dropped receiver means the caller stopped waiting.
                let _ = reply.send(instance.state().clone());
            }
            Envelope::Command(cmd) => match instance.process(cmd).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => return Served::Stopped,
                Err(failure) => return Served::Failed(failure),
            },
        }
    }
    Served::Disconnected
}
