//! The effect algebra: a description of what handling one command asks
//! the processor to do, without doing any of it.
//!
//! [`Behavior::handle`](crate::Behavior::handle) returns an [`Effect`];
//! the command processor evaluates it. Effects never mutate state
//! directly -- only [`Behavior::apply`](crate::Behavior::apply) produces
//! the next state, which is what lets recovery reuse the identical event
//! handler used in live processing.

use std::fmt;

use crate::event::Event;

/// A deferred, at-most-once callback run strictly after its event's
/// append is acknowledged durable -- never before, never on a failed
/// append. Receives the state with the event already applied.
pub type SideEffect<B> = Box<dyn FnOnce(&B) + Send>;

/// The outcome of handling one command, as a description.
///
/// Evaluated to completion (a single persisted event or none) by the
/// command processor before the next command is handled, so one command
/// never produces more than one persist outcome.
pub enum Effect<B> {
    /// No event persisted, no state change, no side effect.
    NoOp,

    /// Durably append `event`, fold it into state, then run `and_then`
    /// if present.
    Persist {
        /// The event to append.
        event: Event,
        /// Callback run exactly once after a successful append.
        and_then: Option<SideEffect<B>>,
    },
}

impl<B> Effect<B> {
    /// The do-nothing effect.
    pub fn none() -> Self {
        Self::NoOp
    }

    /// Persist `event`, with no side effect attached.
    pub fn persist(event: Event) -> Self {
        Self::Persist {
            event,
            and_then: None,
        }
    }

    /// Attach a side effect to run after the persist succeeds.
    ///
    /// On [`Effect::NoOp`] this is a no-op: side effects only exist
    /// downstream of a persist. Attaching a second callback replaces the
    /// first.
    pub fn and_then<F>(self, f: F) -> Self
    where
        F: FnOnce(&B) + Send + 'static,
    {
        match self {
            Self::NoOp => Self::NoOp,
            Self::Persist { event, .. } => Self::Persist {
                event,
                and_then: Some(Box::new(f)),
            },
        }
    }
}

// Manual `Debug` because the boxed side effect is opaque.
impl<B> fmt::Debug for Effect<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOp => f.write_str("NoOp"),
            Self::Persist { event, and_then } => f
                .debug_struct("Persist")
                .field("event", event)
                .field("and_then", &and_then.is_some())
                .finish(),
        }
    }
}
