//! Event-sourced single-writer entities with persist-then-apply,
//! replay recovery, and restart supervision.
//!
//! One entity is a single logical unit of state identified by a
//! [`PersistenceId`], processed on a single logical thread of control:
//! commands arrive one at a time, accepted commands become durable
//! events through a persist-then-apply protocol, and state is only ever
//! the fold of [`Behavior::apply`] over the journaled events. On any
//! unhandled failure the supervisor restarts the entity from scratch;
//! nothing in memory survives, everything in the journal does.
//!
//! Storage is external: the core consumes it through the narrow
//! [`Journal`] trait. [`MemoryJournal`] is the in-process backend used
//! by the test suite and examples.
//!
//! # Example
//!
//! ```
//! use durable_entity::{spawn_entity, Behavior, Effect, Event, MemoryJournal};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, Default)]
//! struct Log {
//!     lines: Vec<String>,
//! }
//!
//! impl Behavior for Log {
//!     type Command = String;
//!
//!     fn handle(&self, line: String) -> Effect<Self> {
//!         Effect::persist(Event::new(line))
//!     }
//!
//!     fn apply(mut self, event: &Event) -> Self {
//!         self.lines.push(event.payload.clone());
//!         self
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let journal = Arc::new(MemoryJournal::new());
//! let handle = spawn_entity::<Log>(journal, "log-1");
//!
//! handle.tell("first".into()).await?;
//! handle.tell("second".into()).await?;
//! assert_eq!(handle.state().await?.lines, vec!["first", "second"]);
//!
//! handle.stop().await?;
//! handle.stopped().await?;
//! # Ok::<(), durable_entity::EntityGone>(())
//! # }).unwrap();
//! ```

mod behavior;
pub use behavior::Behavior;
mod command;
pub use command::EntityCommand;
mod effect;
pub use effect::{Effect, SideEffect};
mod entity;
pub use entity::{spawn_entity, EntityBuilder, EntityHandle};
mod error;
pub use error::{EntityGone, Failure, JournalError, RecoveryError};
mod event;
pub use event::{Event, PersistenceId, SequenceNumber};
mod journal;
pub use journal::{Journal, MemoryJournal};
mod params;
mod processor;
pub use processor::RecoveryHook;
mod recovery;
mod supervisor;
