//! The closed inbound command surface of an entity.

use crate::event::SequenceNumber;

/// A command delivered to a running entity.
///
/// Commands are transient: they are never persisted, and a rejected or
/// failed command leaves no trace in the journal. Delivery is one at a
/// time, in receipt order, per entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityCommand<C> {
    /// An application command, forwarded to
    /// [`Behavior::handle`](crate::Behavior::handle).
    Command(C),

    /// Arrange for an injected failure once the instance's successful
    /// persist count reaches `n`.
    ///
    /// The failure fires at side-effect time, strictly *after* the n-th
    /// event's successful append, so that event is durable and visible
    /// after the restart the failure triggers. The fail point lives in
    /// the instance's fault-injection parameters, which reset on every
    /// recovery -- the injection is one-shot, and a fail point at or
    /// below the already-reached persist count never fires.
    ///
    /// This exists to validate restart-and-recover behavior; it is not a
    /// production feature, but its contract is part of the core.
    InjectFailureAt(SequenceNumber),

    /// Stop the entity cleanly.
    ///
    /// Not a failure: the supervisor does not restart, and a `Stopped`
    /// notification is published to observers awaiting
    /// [`EntityHandle::stopped`](crate::EntityHandle::stopped).
    Stop,
}
