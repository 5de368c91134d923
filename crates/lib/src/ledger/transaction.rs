//! Staged reads and writes for one ledger operation.
//!
//! A `Transaction` overlays its staged writes on the store: every read sees
//! the transaction's own pending changes, and nothing reaches the store until
//! [`Transaction::commit`] hands the whole [`Changeset`] over at once. Dropping
//! a transaction without committing discards everything it staged, which is
//! how a failing action leaves no partial state behind.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::{LedgerCore, events::LedgerEvent};
use crate::{
    Result,
    ids::{ActionId, NodeId, RevisionId, UserId},
    model::{Action, ActionRepute, Node, NodeRevision, Tag, User},
    settings::Settings,
    store::{
        ActionFilter, Changeset, Record, RecordKey, ReputeFilter, StoreError, StoredRecord,
        Write, sort_actions,
    },
};

#[derive(Debug, Clone)]
enum Staged {
    Put(Record),
    Delete { version: u64 },
}

/// Unit of work over the entity store.
pub struct Transaction<'l> {
    core: &'l LedgerCore,
    now: DateTime<Utc>,
    staged: HashMap<RecordKey, Staged>,
    order: Vec<RecordKey>,
    events: Vec<LedgerEvent>,
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("now", &self.now)
            .field("staged", &self.order.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl<'l> Transaction<'l> {
    pub(crate) fn new(core: &'l LedgerCore) -> Self {
        Self {
            core,
            now: core.clock.now(),
            staged: HashMap::new(),
            order: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Timestamp shared by every record this transaction writes.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn settings(&self) -> &Settings {
        &self.core.settings
    }

    pub(crate) fn core(&self) -> &'l LedgerCore {
        self.core
    }

    // === Reads ===

    /// Reads a record, preferring this transaction's staged copy.
    pub fn get(&self, key: &RecordKey) -> Result<Option<Record>> {
        match self.staged.get(key) {
            Some(Staged::Put(record)) => Ok(Some(record.clone())),
            Some(Staged::Delete { .. }) => Ok(None),
            None => self.core.store.get(key),
        }
    }

    fn fetch<T: StoredRecord>(&self, key: RecordKey) -> Result<T> {
        self.get(&key)?
            .and_then(T::from_record)
            .ok_or_else(|| StoreError::RecordNotFound { key }.into())
    }

    pub fn user(&self, id: &UserId) -> Result<User> {
        self.fetch(RecordKey::User(id.clone()))
    }

    pub fn node(&self, id: &NodeId) -> Result<Node> {
        self.fetch(RecordKey::Node(id.clone()))
    }

    pub fn revision(&self, id: &RevisionId) -> Result<NodeRevision> {
        self.fetch(RecordKey::Revision(id.clone()))
    }

    pub fn action(&self, id: &ActionId) -> Result<Action> {
        self.fetch(RecordKey::Action(id.clone()))
    }

    pub fn tag(&self, name: &str) -> Result<Option<Tag>> {
        Ok(self
            .get(&RecordKey::Tag(name.to_string()))?
            .and_then(Tag::from_record))
    }

    /// Replaces stored rows with staged ones and adds staged rows that
    /// `keep` accepts.
    fn merge<T: StoredRecord>(&self, mut found: Vec<T>, keep: impl Fn(&T) -> bool) -> Vec<T> {
        found.retain(|r| !self.staged.contains_key(&r.key()));
        let staged = self.order.iter().filter_map(|key| match self.staged.get(key) {
            Some(Staged::Put(record)) => T::from_record(record.clone()),
            _ => None,
        });
        found.extend(staged.filter(|r| keep(r)));
        found
    }

    pub fn children(&self, parent: &NodeId) -> Result<Vec<Node>> {
        let found = self.core.store.children(parent)?;
        let mut nodes = self.merge(found, |n: &Node| n.parent.as_ref() == Some(parent));
        nodes.sort_by(|a, b| a.added_at.cmp(&b.added_at).then_with(|| a.id.cmp(&b.id)));
        Ok(nodes)
    }

    pub fn revisions(&self, node: &NodeId) -> Result<Vec<NodeRevision>> {
        let found = self.core.store.revisions(node)?;
        let mut revisions = self.merge(found, |r: &NodeRevision| &r.node == node);
        revisions.sort_by_key(|r| r.revision);
        Ok(revisions)
    }

    pub fn actions(&self, filter: &ActionFilter) -> Result<Vec<Action>> {
        let found = self.core.store.actions(filter)?;
        let mut actions = self.merge(found, |a: &Action| filter.matches(a));
        sort_actions(&mut actions);
        Ok(actions)
    }

    pub fn reputes(&self, filter: &ReputeFilter) -> Result<Vec<ActionRepute>> {
        let found = self.core.store.reputes(filter)?;
        let mut reputes = self.merge(found, |r: &ActionRepute| filter.matches(r));
        reputes.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(reputes)
    }

    // === Writes ===

    /// Stages a create or update of `record`.
    pub(crate) fn put(&mut self, record: impl Into<Record>) {
        let record = record.into();
        let key = record.key();
        if !self.staged.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.staged.insert(key, Staged::Put(record));
    }

    /// Stages removal of `record`.
    ///
    /// A record created in this transaction is simply unstaged.
    pub(crate) fn delete(&mut self, record: impl Into<Record>) {
        let record = record.into();
        let key = record.key();
        if record.version() == 0 {
            self.staged.remove(&key);
            self.order.retain(|k| k != &key);
            return;
        }
        if !self.staged.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.staged.insert(
            key,
            Staged::Delete {
                version: record.version(),
            },
        );
    }

    pub(crate) fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// Number of staged writes.
    pub fn pending(&self) -> usize {
        self.order.len()
    }

    fn into_changeset(mut self) -> (Changeset, Vec<LedgerEvent>) {
        let writes = self
            .order
            .iter()
            .filter_map(|key| {
                self.staged.remove(key).map(|staged| match staged {
                    Staged::Put(record) => Write::Put(record),
                    Staged::Delete { version } => Write::Delete {
                        key: key.clone(),
                        version,
                    },
                })
            })
            .collect();
        (Changeset { writes }, self.events)
    }

    /// Applies every staged write atomically.
    ///
    /// Returns the events produced by the operation; the caller publishes them.
    pub(crate) fn commit(self) -> Result<Vec<LedgerEvent>> {
        let core = self.core;
        let (changeset, events) = self.into_changeset();
        if !changeset.is_empty() {
            tracing::trace!(writes = changeset.len(), "Committing changeset");
            core.store.apply(changeset)?;
        }
        Ok(events)
    }
}
