//! Crate-level error types: journal failures, recovery failures, the
//! typed restart trigger, and handle-side errors.

use crate::event::SequenceNumber;

/// Error returned by a [`Journal`](crate::Journal) operation.
///
/// Both variants are fatal to the current attempt from the core's
/// perspective: the command processor never retries an append, and the
/// supervisor responds by restarting the entity from durable history.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JournalError {
    /// The backend could not be reached or did not acknowledge in time.
    ///
    /// Carries a backend-supplied description. The core treats this as
    /// opaque; whether the condition is transient is the backend's
    /// business.
    #[error("journal unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected the append because it is out of space.
    #[error("journal full")]
    Full,
}

/// Replay could not complete during entity (re)start.
///
/// Reported to the supervisor as a *start* failure, distinct from a
/// processing failure. The supervisor restarts regardless, which means a
/// persistently unreachable journal crash-loops -- deliberate, logged,
/// and not silently masked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("recovery failed: {0}")]
pub struct RecoveryError(#[from] pub JournalError);

/// An unhandled failure raised while an entity instance was recovering
/// or processing commands.
///
/// This is the typed restart trigger: every variant causes the
/// supervisor to discard the instance's in-memory state and start a
/// fresh one, which rebuilds from the journal. Nothing here is retried
/// in place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    /// An `append` failed while processing a command.
    #[error(transparent)]
    Journal(#[from] JournalError),

    /// A fault-injection side effect fired.
    ///
    /// Raised strictly after the triggering event's successful persist,
    /// so recovery after restart observes that event as already applied.
    /// Used to validate restart-and-recover behavior; see
    /// [`EntityCommand::InjectFailureAt`](crate::EntityCommand::InjectFailureAt).
    #[error("injected failure after persist #{at}")]
    Injected {
        /// The persist count at which the failure fired.
        at: SequenceNumber,
    },

    /// Replay failed during (re)start.
    #[error(transparent)]
    Recovery(#[from] RecoveryError),
}

/// The entity task is no longer running.
///
/// Returned by [`EntityHandle`](crate::EntityHandle) methods when the
/// mailbox is closed: the entity stopped, or every handle was dropped
/// and the task exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("entity is no longer running")]
pub struct EntityGone;
