//! Identity and event types shared by every module in the crate.
//!
//! No I/O occurs here; these are the plain data types the journal,
//! recovery, and processing modules all agree on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Monotonically increasing per-entity event counter.
///
/// The first persisted event for a [`PersistenceId`] is assigned 1; the
/// value 0 means "no events yet". Under normal operation the sequence is
/// strictly increasing by exactly 1 per successful persist, with no gaps,
/// and replay reconstructs the identical numbering.
pub type SequenceNumber = u64;

/// Stable identifier for one logical entity.
///
/// Used as the journal partition key: all events appended under the same
/// id form one totally ordered stream. The id is immutable for the
/// entity's lifetime.
///
/// # Examples
///
/// ```
/// use durable_entity::PersistenceId;
///
/// let id = PersistenceId::new("order-42");
/// assert_eq!(id.as_str(), "order-42");
/// assert_eq!(id.to_string(), "order-42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersistenceId(String);

impl PersistenceId {
    /// Create a new persistence id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersistenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersistenceId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PersistenceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The durable unit: an opaque payload. The journal assigns each event
/// its [`SequenceNumber`] at persist time and carries it alongside, not
/// inside, the event.
///
/// Events are immutable once written. The payload is deliberately opaque
/// to this core -- interpretation belongs to
/// [`Behavior::apply`](crate::Behavior::apply), which folds events into
/// state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Opaque event payload.
    pub payload: String,
}

impl Event {
    /// Create an event carrying the given payload.
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}
