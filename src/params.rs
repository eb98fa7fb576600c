//! Per-instance counters driving normal operation and fault injection.

use crate::event::SequenceNumber;

/// Mutable counters owned exclusively by one running entity instance.
///
/// Not domain state: never persisted, never shared across instances, and
/// reset to defaults on every recovery. `persist_calls` counts successful
/// persists of the current instance; `fail_at` is the optional
/// fault-injection point set by
/// [`EntityCommand::InjectFailureAt`](crate::EntityCommand::InjectFailureAt).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Parameters {
    /// Successful persists performed by this instance.
    pub persist_calls: u64,
    /// Persist count at which the next side-effect evaluation fails.
    pub fail_at: Option<SequenceNumber>,
}

impl Parameters {
    /// True when the fail point is set and has just been reached.
    ///
    /// Strict equality: a fail point at or below an already-reached
    /// count never fires.
    pub(crate) fn fail_point_reached(&self) -> bool {
        self.fail_at == Some(self.persist_calls)
    }
}
