//! In-memory entity store
//!
//! This module provides an in-memory implementation of the `EntityStore`
//! trait, suitable for tests, the CLI, or deployments that persist the whole
//! state externally by saving and loading it as a JSON file.

mod persistence;
mod storage;

use std::{any::Any, collections::HashMap, path::Path, sync::RwLock};

use serde::{Deserialize, Serialize};

use super::{ActionFilter, Changeset, EntityStore, Record, RecordKey, ReputeFilter};
use crate::{
    Result,
    ids::{ActionId, NodeId, ReputeId, RevisionId, UserId},
    model::{Action, ActionRepute, Node, NodeRevision, Tag, User},
};

/// One map per record kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Tables {
    #[serde(default)]
    pub(crate) users: HashMap<UserId, User>,
    #[serde(default)]
    pub(crate) nodes: HashMap<NodeId, Node>,
    #[serde(default)]
    pub(crate) revisions: HashMap<RevisionId, NodeRevision>,
    #[serde(default)]
    pub(crate) actions: HashMap<ActionId, Action>,
    #[serde(default)]
    pub(crate) reputes: HashMap<ReputeId, ActionRepute>,
    #[serde(default)]
    pub(crate) tags: HashMap<String, Tag>,
}

/// A simple in-memory store keeping every record in `HashMap`s behind a
/// single lock.
///
/// One lock over all tables is what makes [`EntityStore::apply`] atomic: a
/// changeset is validated and written while the write guard is held, so
/// readers never observe half of it.
///
/// It provides basic persistence via `save_to_file` and `load_from_file`,
/// serializing the tables to JSON.
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) tables: RwLock<Tables>,
}

impl InMemory {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records of every kind, for diagnostics.
    pub fn record_count(&self) -> usize {
        let tables = self.tables.read().unwrap();
        tables.users.len()
            + tables.nodes.len()
            + tables.revisions.len()
            + tables.actions.len()
            + tables.reputes.len()
            + tables.tags.len()
    }

    /// Saves every table to `path` as pretty-printed JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path)
    }

    /// Loads a store from a JSON file.
    ///
    /// If the file does not exist, a new, empty store is returned.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path)
    }
}

impl EntityStore for InMemory {
    fn get(&self, key: &RecordKey) -> Result<Option<Record>> {
        Ok(storage::get(&self.tables.read().unwrap(), key))
    }

    fn users(&self) -> Result<Vec<User>> {
        let tables = self.tables.read().unwrap();
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| {
            a.date_joined
                .cmp(&b.date_joined)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(users)
    }

    fn children(&self, parent: &NodeId) -> Result<Vec<Node>> {
        let tables = self.tables.read().unwrap();
        let mut nodes: Vec<Node> = tables
            .nodes
            .values()
            .filter(|n| n.parent.as_ref() == Some(parent))
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.added_at.cmp(&b.added_at).then_with(|| a.id.cmp(&b.id)));
        Ok(nodes)
    }

    fn revisions(&self, node: &NodeId) -> Result<Vec<NodeRevision>> {
        let tables = self.tables.read().unwrap();
        let mut revisions: Vec<NodeRevision> = tables
            .revisions
            .values()
            .filter(|r| &r.node == node)
            .cloned()
            .collect();
        revisions.sort_by_key(|r| r.revision);
        Ok(revisions)
    }

    fn actions(&self, filter: &ActionFilter) -> Result<Vec<Action>> {
        let tables = self.tables.read().unwrap();
        let mut actions: Vec<Action> = tables
            .actions
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        super::sort_actions(&mut actions);
        Ok(actions)
    }

    fn reputes(&self, filter: &ReputeFilter) -> Result<Vec<ActionRepute>> {
        let tables = self.tables.read().unwrap();
        let mut reputes: Vec<ActionRepute> = tables
            .reputes
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        reputes.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(reputes)
    }

    fn tags(&self) -> Result<Vec<Tag>> {
        let tables = self.tables.read().unwrap();
        let mut tags: Vec<Tag> = tables.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    fn apply(&self, changeset: Changeset) -> Result<()> {
        let mut tables = self.tables.write().unwrap();
        storage::apply(&mut tables, changeset)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
