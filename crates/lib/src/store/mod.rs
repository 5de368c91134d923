//! Entity storage for ledger records.
//!
//! The `EntityStore` trait is the only thing the ledger knows about storage:
//! point lookups by [`RecordKey`], a handful of filtered scans, and atomic
//! application of a [`Changeset`]. Every record carries a `version` which the
//! store checks on write, giving per-record compare-and-swap semantics.

use std::any::Any;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    ids::{ActionId, NodeId, ReputeId, RevisionId, UserId},
    model::{Action, ActionRepute, Node, NodeRevision, Tag, User},
};

mod errors;
mod in_memory;

pub use errors::StoreError;
pub use in_memory::InMemory;

/// Key addressing a single stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum RecordKey {
    User(UserId),
    Node(NodeId),
    Revision(RevisionId),
    Action(ActionId),
    Repute(ReputeId),
    Tag(String),
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKey::User(id) => write!(f, "user:{id}"),
            RecordKey::Node(id) => write!(f, "node:{id}"),
            RecordKey::Revision(id) => write!(f, "revision:{id}"),
            RecordKey::Action(id) => write!(f, "action:{id}"),
            RecordKey::Repute(id) => write!(f, "repute:{id}"),
            RecordKey::Tag(name) => write!(f, "tag:{name}"),
        }
    }
}

/// Any record the store holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Record {
    User(User),
    Node(Node),
    Revision(NodeRevision),
    Action(Action),
    Repute(ActionRepute),
    Tag(Tag),
}

impl Record {
    pub fn key(&self) -> RecordKey {
        match self {
            Record::User(r) => r.key(),
            Record::Node(r) => r.key(),
            Record::Revision(r) => r.key(),
            Record::Action(r) => r.key(),
            Record::Repute(r) => r.key(),
            Record::Tag(r) => r.key(),
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            Record::User(r) => r.version,
            Record::Node(r) => r.version,
            Record::Revision(r) => r.version,
            Record::Action(r) => r.version,
            Record::Repute(r) => r.version,
            Record::Tag(r) => r.version,
        }
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        match self {
            Record::User(r) => r.version = version,
            Record::Node(r) => r.version = version,
            Record::Revision(r) => r.version = version,
            Record::Action(r) => r.version = version,
            Record::Repute(r) => r.version = version,
            Record::Tag(r) => r.version = version,
        }
    }
}

/// A concrete record type that can be stored and read back from a [`Record`].
pub trait StoredRecord: Clone + Into<Record> {
    fn key(&self) -> RecordKey;
    fn version(&self) -> u64;
    fn from_record(record: Record) -> Option<Self>;
}

macro_rules! stored_record {
    ($ty:ty, $variant:ident, |$r:ident| $key:expr) => {
        impl From<$ty> for Record {
            fn from(r: $ty) -> Self {
                Record::$variant(r)
            }
        }

        impl StoredRecord for $ty {
            fn key(&self) -> RecordKey {
                let $r = self;
                RecordKey::$variant($key)
            }

            fn version(&self) -> u64 {
                self.version
            }

            fn from_record(record: Record) -> Option<Self> {
                match record {
                    Record::$variant(r) => Some(r),
                    _ => None,
                }
            }
        }
    };
}

stored_record!(User, User, |r| r.id.clone());
stored_record!(Node, Node, |r| r.id.clone());
stored_record!(NodeRevision, Revision, |r| r.id.clone());
stored_record!(Action, Action, |r| r.id.clone());
stored_record!(ActionRepute, Repute, |r| r.id.clone());
stored_record!(Tag, Tag, |r| r.name.clone());

/// A single staged write.
///
/// `Put` of a record with version 0 creates it and fails if the key exists.
/// Any other `Put` or `Delete` must name the version currently stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Put(Record),
    Delete { key: RecordKey, version: u64 },
}

impl Write {
    pub fn key(&self) -> RecordKey {
        match self {
            Write::Put(record) => record.key(),
            Write::Delete { key, .. } => key.clone(),
        }
    }
}

/// Writes applied together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    pub writes: Vec<Write>,
}

impl Changeset {
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }
}

/// Selects actions in a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionFilter {
    pub user: Option<UserId>,
    pub node: Option<NodeId>,
    /// Empty means every type.
    pub action_types: Vec<String>,
    pub live_only: bool,
    /// Only actions dated at or after this instant.
    pub since: Option<DateTime<Utc>>,
}

impl ActionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, user: &UserId) -> Self {
        self.user = Some(user.clone());
        self
    }

    pub fn node(mut self, node: &NodeId) -> Self {
        self.node = Some(node.clone());
        self
    }

    pub fn action_type(mut self, tag: impl Into<String>) -> Self {
        self.action_types.push(tag.into());
        self
    }

    pub fn action_types<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.action_types.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn live(mut self) -> Self {
        self.live_only = true;
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn matches(&self, action: &Action) -> bool {
        if self.user.as_ref().is_some_and(|u| u != &action.user) {
            return false;
        }
        if self
            .node
            .as_ref()
            .is_some_and(|n| action.node.as_ref() != Some(n))
        {
            return false;
        }
        if !self.action_types.is_empty() && !self.action_types.contains(&action.action_type) {
            return false;
        }
        if self.live_only && action.canceled {
            return false;
        }
        if self.since.is_some_and(|since| action.action_date < since) {
            return false;
        }
        true
    }
}

/// Selects reputation rows in a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReputeFilter {
    pub action: Option<ActionId>,
    pub user: Option<UserId>,
}

impl ReputeFilter {
    pub fn action(action: &ActionId) -> Self {
        Self {
            action: Some(action.clone()),
            user: None,
        }
    }

    pub fn user(user: &UserId) -> Self {
        Self {
            action: None,
            user: Some(user.clone()),
        }
    }

    pub fn matches(&self, repute: &ActionRepute) -> bool {
        self.action.as_ref().is_none_or(|a| a == &repute.action)
            && self.user.as_ref().is_none_or(|u| u == &repute.user)
    }
}

/// Sort order shared by every action listing: oldest first, ties by id.
pub fn sort_actions(actions: &mut [Action]) {
    actions.sort_by(|a, b| {
        a.action_date
            .cmp(&b.action_date)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Storage abstraction for ledger records.
///
/// Implementations must apply a [`Changeset`] atomically and reject it as a
/// whole with [`StoreError::VersionConflict`] when any record's version does
/// not match.
pub trait EntityStore: Send + Sync + Any {
    /// Reads a single record.
    fn get(&self, key: &RecordKey) -> Result<Option<Record>>;

    /// All users, ordered by join date.
    fn users(&self) -> Result<Vec<User>>;

    /// Direct children of a node, oldest first.
    fn children(&self, parent: &NodeId) -> Result<Vec<Node>>;

    /// Every revision of a node, ordered by revision number.
    fn revisions(&self, node: &NodeId) -> Result<Vec<NodeRevision>>;

    /// Actions matching `filter`, sorted with [`sort_actions`].
    fn actions(&self, filter: &ActionFilter) -> Result<Vec<Action>>;

    /// Reputation rows matching `filter`, ordered by id.
    fn reputes(&self, filter: &ReputeFilter) -> Result<Vec<ActionRepute>>;

    /// Every tag, ordered by name.
    fn tags(&self) -> Result<Vec<Tag>>;

    /// Applies all writes or none.
    fn apply(&self, changeset: Changeset) -> Result<()>;

    /// Returns a reference to the store as a dynamic `Any` type.
    fn as_any(&self) -> &dyn Any;

    fn get_user(&self, id: &UserId) -> Result<User> {
        fetch(self, RecordKey::User(id.clone()))
    }

    fn get_node(&self, id: &NodeId) -> Result<Node> {
        fetch(self, RecordKey::Node(id.clone()))
    }

    fn get_revision(&self, id: &RevisionId) -> Result<NodeRevision> {
        fetch(self, RecordKey::Revision(id.clone()))
    }

    fn get_action(&self, id: &ActionId) -> Result<Action> {
        fetch(self, RecordKey::Action(id.clone()))
    }

    fn get_tag(&self, name: &str) -> Result<Option<Tag>> {
        Ok(self
            .get(&RecordKey::Tag(name.to_string()))?
            .and_then(Tag::from_record))
    }
}

fn fetch<S, T>(store: &S, key: RecordKey) -> Result<T>
where
    S: EntityStore + ?Sized,
    T: StoredRecord,
{
    store
        .get(&key)?
        .and_then(T::from_record)
        .ok_or_else(|| StoreError::RecordNotFound { key }.into())
}
