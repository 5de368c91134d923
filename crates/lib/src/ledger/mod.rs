//! The action ledger.
//!
//! [`Ledger`] is the entry point of the crate. It owns the store, the clock,
//! the settings, the action registry and the event bus, and runs every
//! operation as a single [`Transaction`]. A transaction that loses a commit
//! race against another writer is discarded and the whole operation re-run,
//! up to [`MAX_COMMIT_RETRIES`] times.
//!
//! Events are published only after a successful commit.

use std::sync::Arc;

use tracing::warn;

use crate::{
    Result,
    actions::{
        ActionData, ActionDescription, ActionKind, ActionRegistry, ActionType, AnswerAction,
        AskAction, CommentAction, RetagAction, ReviseAction, RollbackAction,
    },
    clock::{Clock, SystemClock},
    constants::MAX_COMMIT_RETRIES,
    content,
    ids::{ActionId, NodeId, RevisionId, UserId},
    model::{Action, ActionRepute, Node, NodeRevision, RevisionContent, Tag, User},
    settings::Settings,
    store::{ActionFilter, EntityStore, ReputeFilter, StoredRecord},
};

mod context;
mod errors;
mod events;
mod lifecycle;
pub mod reputation;
mod transaction;

pub use context::ActionContext;
pub use errors::LedgerError;
pub use events::{EventBus, EventCallback, LedgerEvent};
pub use lifecycle::CancelOutcome;
pub use reputation::ReputationMismatch;
pub use transaction::Transaction;

/// Shared state behind a [`Ledger`] handle.
pub(crate) struct LedgerCore {
    pub(crate) store: Arc<dyn EntityStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) settings: Settings,
    pub(crate) registry: ActionRegistry,
    pub(crate) events: EventBus,
}

impl std::fmt::Debug for LedgerCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerCore")
            .field("store", &"<EntityStore>")
            .field("clock", &self.clock)
            .field("registry", &self.registry.tags())
            .field("events", &self.events)
            .finish()
    }
}

/// Handle to an action ledger.
///
/// Cheap to clone; clones share the same store, settings and subscribers.
#[derive(Clone, Debug)]
pub struct Ledger {
    inner: Arc<LedgerCore>,
}

impl Ledger {
    /// Opens a ledger over `store` using the system clock.
    pub fn open(store: Arc<dyn EntityStore>, settings: Settings) -> Result<Self> {
        Self::open_with_clock(store, settings, Arc::new(SystemClock))
    }

    /// Opens a ledger with an explicit time source.
    pub fn open_with_clock(
        store: Arc<dyn EntityStore>,
        settings: Settings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        settings.validate()?;
        let registry = ActionRegistry::with_builtins()?;
        Ok(Self {
            inner: Arc::new(LedgerCore {
                store,
                clock,
                settings,
                registry,
                events: EventBus::new(),
            }),
        })
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.inner.store
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.inner.registry
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Registers a callback for every event published after a commit.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&LedgerEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.inner.events.subscribe(callback);
    }

    // === Transactions ===

    /// Runs `f` in a fresh transaction and commits it.
    ///
    /// On a version conflict the transaction is dropped and `f` runs again
    /// from scratch. Any error from `f` discards everything it staged.
    pub fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        F: Fn(&mut Transaction<'_>) -> Result<T>,
    {
        let mut attempt = 0;
        loop {
            let mut tx = Transaction::new(&self.inner);
            let value = f(&mut tx)?;
            match tx.commit() {
                Ok(events) => {
                    self.inner.events.publish(&events);
                    return Ok(value);
                }
                Err(e) if e.is_conflict() => {
                    attempt += 1;
                    if attempt > MAX_COMMIT_RETRIES {
                        return Err(LedgerError::RetriesExhausted {
                            operation,
                            attempts: attempt,
                        }
                        .into());
                    }
                    warn!(operation, attempt, "Commit conflict, retrying: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Runs `f` against a transaction that is never committed.
    pub fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let tx = Transaction::new(&self.inner);
        f(&tx)
    }

    /// Re-reads a record after commit so its version is current. Records
    /// that no longer exist come back unchanged.
    pub(crate) fn reload<T: StoredRecord>(&self, record: T) -> Result<T> {
        Ok(self
            .inner
            .store
            .get(&record.key())?
            .and_then(T::from_record)
            .unwrap_or(record))
    }

    // === Users ===

    /// Adds a user with zero reputation.
    pub fn register_user(&self, username: &str) -> Result<User> {
        let user = self.run("register_user", |tx| {
            let user = User::new(username, tx.now());
            tx.put(user.clone());
            Ok(user)
        })?;
        self.reload(user)
    }

    pub fn set_superuser(&self, id: &UserId, is_superuser: bool) -> Result<User> {
        let user = self.run("set_superuser", |tx| {
            let mut user = tx.user(id)?;
            user.is_superuser = is_superuser;
            tx.put(user.clone());
            Ok(user)
        })?;
        self.reload(user)
    }

    pub fn user(&self, id: &UserId) -> Result<User> {
        self.inner.store.get_user(id)
    }

    pub fn find_user(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .store
            .users()?
            .into_iter()
            .find(|u| u.username == username))
    }

    pub fn users(&self) -> Result<Vec<User>> {
        self.inner.store.users()
    }

    // === Actions ===

    /// Creates an action of type `K` with no payload.
    pub fn create<K: ActionType>(
        &self,
        user: &UserId,
        node: Option<&NodeId>,
        extra: &str,
    ) -> Result<Action> {
        self.create_with::<K>(user, node, extra, &ActionData::None)
    }

    /// Creates an action of type `K`, passing `data` to its `process_data`.
    pub fn create_with<K: ActionType>(
        &self,
        user: &UserId,
        node: Option<&NodeId>,
        extra: &str,
        data: &ActionData,
    ) -> Result<Action> {
        self.create_by_tag(&K::type_tag(), user, node, extra, data)
    }

    /// Creates an action from its stored tag.
    pub fn create_by_tag(
        &self,
        tag: &str,
        user: &UserId,
        node: Option<&NodeId>,
        extra: &str,
        data: &ActionData,
    ) -> Result<Action> {
        let action = self.run("create", |tx| {
            tx.create_action(tag, user, node, extra, data)
        })?;
        self.reload(action)
    }

    /// Cancels an action. `by` defaults to the action's own user.
    pub fn cancel(&self, id: &ActionId, by: Option<&UserId>) -> Result<Action> {
        let action = self.run("cancel", |tx| tx.cancel_action(id, by))?;
        self.reload(action)
    }

    /// Removes an action inside the grace window, cancels it otherwise.
    pub fn cancel_or_delete(&self, id: &ActionId, by: Option<&UserId>) -> Result<CancelOutcome> {
        match self.run("cancel_or_delete", |tx| tx.cancel_or_delete_action(id, by))? {
            CancelOutcome::Canceled(action) => Ok(CancelOutcome::Canceled(self.reload(action)?)),
            deleted => Ok(deleted),
        }
    }

    /// Undoes the live `K` action by `user` on `node`, or creates one.
    ///
    /// Returns the affected action and whether it was created.
    pub fn create_or_cancel<K: ActionType>(
        &self,
        user: &UserId,
        node: &NodeId,
        extra: &str,
    ) -> Result<(Action, bool)> {
        let tag = K::type_tag();
        let (action, created) = self.run("create_or_cancel", |tx| {
            tx.create_or_cancel_action(&tag, user, node, extra)
        })?;
        Ok((self.reload(action)?, created))
    }

    /// The live action of any of `types` by `user` on `node`.
    pub fn get_current<S: AsRef<str>>(
        &self,
        types: &[S],
        node: &NodeId,
        user: &UserId,
    ) -> Result<Action> {
        self.find_current(types, node, user)?.ok_or_else(|| {
            LedgerError::NoCurrentAction {
                types: types.iter().map(|t| t.as_ref().to_string()).collect(),
                user: user.clone(),
                node: node.clone(),
            }
            .into()
        })
    }

    pub fn find_current<S: AsRef<str>>(
        &self,
        types: &[S],
        node: &NodeId,
        user: &UserId,
    ) -> Result<Option<Action>> {
        self.read(|tx| tx.current_action(types, node, user))
    }

    pub fn action(&self, id: &ActionId) -> Result<Action> {
        self.inner.store.get_action(id)
    }

    pub fn actions(&self, filter: &ActionFilter) -> Result<Vec<Action>> {
        self.inner.store.actions(filter)
    }

    /// The behaviour for an action's tag; unknown tags get the inert base.
    pub fn resolve(&self, action: &Action) -> Arc<dyn ActionKind> {
        self.inner.registry.resolve(&action.action_type)
    }

    pub fn describe(&self, id: &ActionId) -> Result<ActionDescription> {
        self.read(|tx| {
            let action = tx.action(id)?;
            self.resolve(&action).describe(&action, tx)
        })
    }

    // === Content ===

    /// Asks a question. Returns the action and the new node.
    pub fn ask(&self, user: &UserId, content: RevisionContent) -> Result<(Action, Node)> {
        let action = self.create_with::<AskAction>(user, None, "", &ActionData::Ask(content))?;
        self.with_node(action)
    }

    pub fn answer(
        &self,
        user: &UserId,
        question: &NodeId,
        content: RevisionContent,
    ) -> Result<(Action, Node)> {
        let data = ActionData::Answer {
            question: question.clone(),
            content,
        };
        let action = self.create_with::<AnswerAction>(user, None, "", &data)?;
        self.with_node(action)
    }

    pub fn comment(&self, user: &UserId, parent: &NodeId, text: &str) -> Result<(Action, Node)> {
        let data = ActionData::Comment {
            parent: parent.clone(),
            text: text.to_string(),
        };
        let action = self.create_with::<CommentAction>(user, None, "", &data)?;
        self.with_node(action)
    }

    fn with_node(&self, action: Action) -> Result<(Action, Node)> {
        let node_id = action.node.clone().ok_or_else(|| LedgerError::TargetRequired {
            action_type: action.action_type.clone(),
        })?;
        let node = self.node(&node_id)?;
        Ok((action, node))
    }

    /// Edits a node through a revise action.
    pub fn revise(
        &self,
        user: &UserId,
        node: &NodeId,
        content: RevisionContent,
    ) -> Result<(Action, NodeRevision)> {
        let action =
            self.create_with::<ReviseAction>(user, Some(node), "", &ActionData::Revise(content))?;
        let revision = self
            .inner
            .store
            .get_revision(&RevisionId::from(action.extra.as_str()))?;
        Ok((action, revision))
    }

    pub fn retag(&self, user: &UserId, node: &NodeId, tag_names: &str) -> Result<Action> {
        let data = ActionData::Retag {
            tag_names: tag_names.to_string(),
        };
        self.create_with::<RetagAction>(user, Some(node), "", &data)
    }

    /// Reactivates revision number `revision` through a rollback action.
    pub fn rollback(&self, user: &UserId, node: &NodeId, revision: u32) -> Result<Action> {
        self.create_with::<RollbackAction>(user, Some(node), "", &ActionData::Rollback { revision })
    }

    /// Adds and activates a revision without a triggering action.
    pub fn create_revision(
        &self,
        node: &NodeId,
        author: &UserId,
        content: RevisionContent,
    ) -> Result<NodeRevision> {
        let revision = self.run("create_revision", |tx| {
            content::create_revision(tx, node, author, content.clone(), None)
        })?;
        self.reload(revision)
    }

    /// Activates an existing revision, optionally on behalf of an action.
    pub fn activate_revision(
        &self,
        node: &NodeId,
        author: &UserId,
        revision: &RevisionId,
        action: Option<&ActionId>,
    ) -> Result<()> {
        self.run("activate_revision", |tx| {
            let action = action.map(|id| tx.action(id)).transpose()?;
            content::activate_revision(tx, node, author, revision, action.as_ref())
        })
    }

    pub fn node(&self, id: &NodeId) -> Result<Node> {
        self.inner.store.get_node(id)
    }

    pub fn children(&self, id: &NodeId) -> Result<Vec<Node>> {
        self.inner.store.children(id)
    }

    pub fn revisions(&self, node: &NodeId) -> Result<Vec<NodeRevision>> {
        self.inner.store.revisions(node)
    }

    pub fn tag(&self, name: &str) -> Result<Option<Tag>> {
        self.inner.store.get_tag(name)
    }

    pub fn tags(&self) -> Result<Vec<Tag>> {
        self.inner.store.tags()
    }

    // === Reputation ===

    pub fn reputes_for_user(&self, user: &UserId) -> Result<Vec<ActionRepute>> {
        self.inner.store.reputes(&ReputeFilter::user(user))
    }

    pub fn reputes_for_action(&self, action: &ActionId) -> Result<Vec<ActionRepute>> {
        self.inner.store.reputes(&ReputeFilter::action(action))
    }

    /// Users whose reputation counter disagrees with their rows.
    pub fn audit_reputation(&self) -> Result<Vec<ReputationMismatch>> {
        reputation::audit(self.inner.store.as_ref())
    }
}

#[cfg(test)]
mod tests;
