//! Public spawn surface: builder, convenience spawn, and the cloneable
//! async handle to a running entity.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use crate::behavior::Behavior;
use crate::command::EntityCommand;
use crate::error::EntityGone;
use crate::event::{PersistenceId, SequenceNumber};
use crate::journal::Journal;
use crate::processor::RecoveryHook;
use crate::supervisor::{run_supervisor, Envelope};

/// Default mailbox capacity for a spawned entity.
const DEFAULT_MAILBOX_CAPACITY: usize = 32;

/// Configures and spawns one supervised entity.
///
/// # Examples
///
/// ```
/// use durable_entity::{
///     Behavior, Effect, EntityBuilder, Event, MemoryJournal, PersistenceId,
/// };
/// use std::sync::Arc;
///
/// #[derive(Debug, Clone, Default)]
/// struct Tally {
///     total: u64,
/// }
///
/// impl Behavior for Tally {
///     type Command = u64;
///
///     fn handle(&self, amount: u64) -> Effect<Self> {
///         Effect::persist(Event::new(amount.to_string()))
///     }
///
///     fn apply(mut self, event: &Event) -> Self {
///         self.total += event.payload.parse::<u64>().unwrap_or(0);
///         self
///     }
/// }
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let journal = Arc::new(MemoryJournal::new());
/// let handle = EntityBuilder::<Tally>::new(journal, PersistenceId::new("tally-1")).spawn();
///
/// handle.tell(2).await?;
/// handle.tell(3).await?;
/// assert_eq!(handle.state().await?.total, 5);
/// # Ok::<(), durable_entity::EntityGone>(())
/// # }).unwrap();
/// ```
pub struct EntityBuilder<B: Behavior> {
    journal: Arc<dyn Journal>,
    id: PersistenceId,
    hook: Option<RecoveryHook<B>>,
    mailbox_capacity: usize,
}

impl<B: Behavior> EntityBuilder<B> {
    /// Start building an entity for `id`, persisting through `journal`.
    pub fn new(journal: Arc<dyn Journal>, id: impl Into<PersistenceId>) -> Self {
        Self {
            journal,
            id: id.into(),
            hook: None,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
        }
    }

    /// Install an observational hook invoked once per completed
    /// recovery -- on the initial start and after every restart,
    /// including for an empty history -- with the replayed state.
    ///
    /// The hook receives `&B` only and cannot emit events.
    pub fn on_recovery_completed<F>(mut self, f: F) -> Self
    where
        F: Fn(&B) + Send + Sync + 'static,
    {
        self.hook = Some(Box::new(f));
        self
    }

    /// Override the mailbox capacity (default 32).
    ///
    /// Senders suspend when the mailbox is full, which is the only
    /// backpressure this core applies.
    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// Spawn the supervised entity on the current tokio runtime.
    ///
    /// The entity recovers from its journal, then serves commands until
    /// stopped or until every handle is dropped. Must be called from
    /// within a tokio runtime.
    pub fn spawn(self) -> EntityHandle<B> {
        let (tx, rx) = mpsc::channel(self.mailbox_capacity);
        let (stopped_tx, stopped_rx) = watch::channel(false);

        tracing::debug!(persistence_id = %self.id, "spawning entity");
        tokio::spawn(run_supervisor::<B>(
            self.journal,
            self.id,
            self.hook,
            rx,
            stopped_tx,
        ));

        EntityHandle {
            sender: tx,
            stopped: stopped_rx,
        }
    }
}

/// Spawn an entity with default configuration.
///
/// Shorthand for `EntityBuilder::new(journal, id).spawn()`.
pub fn spawn_entity<B: Behavior>(
    journal: Arc<dyn Journal>,
    id: impl Into<PersistenceId>,
) -> EntityHandle<B> {
    EntityBuilder::new(journal, id).spawn()
}

/// Async handle to a running supervised entity.
///
/// Lightweight and cloneable; all clones address the same entity. The
/// entity keeps running while at least one handle exists, across any
/// number of supervisor restarts, until [`stop`](EntityHandle::stop).
#[derive(Debug)]
pub struct EntityHandle<B: Behavior> {
    sender: mpsc::Sender<Envelope<B>>,
    stopped: watch::Receiver<bool>,
}

// Manual `Clone`: only the channel ends are cloned, so no bound beyond
// `Behavior` is needed.
impl<B: Behavior> Clone for EntityHandle<B> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            stopped: self.stopped.clone(),
        }
    }
}

impl<B: Behavior> EntityHandle<B> {
    /// Deliver one command from the closed inbound set.
    ///
    /// Commands are processed strictly one at a time, in receipt order.
    /// Suspends while the mailbox is full.
    ///
    /// # Errors
    ///
    /// [`EntityGone`] if the entity has stopped or its task exited.
    pub async fn send(&self, cmd: EntityCommand<B::Command>) -> Result<(), EntityGone> {
        self.sender
            .send(Envelope::Command(cmd))
            .await
            .map_err(|_| EntityGone)
    }

    /// Deliver an application command.
    ///
    /// Shorthand for `send(EntityCommand::Command(cmd))`.
    ///
    /// # Errors
    ///
    /// [`EntityGone`] if the entity has stopped or its task exited.
    pub async fn tell(&self, cmd: B::Command) -> Result<(), EntityGone> {
        self.send(EntityCommand::Command(cmd)).await
    }

    /// Arrange an injected failure at the given successful-persist count.
    ///
    /// See [`EntityCommand::InjectFailureAt`] for the contract.
    ///
    /// # Errors
    ///
    /// [`EntityGone`] if the entity has stopped or its task exited.
    pub async fn inject_failure_at(&self, at: SequenceNumber) -> Result<(), EntityGone> {
        self.send(EntityCommand::InjectFailureAt(at)).await
    }

    /// Stop the entity cleanly.
    ///
    /// Commands already queued ahead of the stop are processed first.
    /// Await [`stopped`](EntityHandle::stopped) to observe termination.
    ///
    /// # Errors
    ///
    /// [`EntityGone`] if the entity already exited.
    pub async fn stop(&self) -> Result<(), EntityGone> {
        self.send(EntityCommand::Stop).await
    }

    /// Read the current state.
    ///
    /// The query routes through the mailbox, so the returned state
    /// reflects every command sent on this handle before it -- including
    /// commands that were in flight across a restart.
    ///
    /// # Errors
    ///
    /// [`EntityGone`] if the entity has stopped or its task exited.
    pub async fn state(&self) -> Result<B, EntityGone> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(Envelope::GetState { reply })
            .await
            .map_err(|_| EntityGone)?;
        rx.await.map_err(|_| EntityGone)
    }

    /// Wait for the `Stopped` notification.
    ///
    /// Resolves once the entity has processed a
    /// [`Stop`](EntityCommand::Stop) command and terminated.
    ///
    /// # Errors
    ///
    /// [`EntityGone`] if the entity exited without stopping cleanly
    /// (every handle dropped).
    pub async fn stopped(&self) -> Result<(), EntityGone> {
        let mut stopped = self.stopped.clone();
        stopped
            .wait_for(|flag| *flag)
            .await
            .map(|_| ())
            .map_err(|_| EntityGone)
    }

    /// Whether the entity task is still accepting commands.
    pub fn is_alive(&self) -> bool {
        !self.sender.is_closed()
    }
}
