use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ActionId, NodeId, RevisionId, UserId};

/// Kind of content a node holds. Fixed when the node is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Question,
    Answer,
    Comment,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Question => "question",
            NodeType::Answer => "answer",
            NodeType::Comment => "comment",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A versioned piece of forum content.
///
/// `title`, `tag_names` and `body` mirror the active revision and are only
/// written by revision activation. `flag_count`, `comment_count` and
/// `favorite_count` are caches recomputed from live rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub node_type: NodeType,
    pub author: UserId,
    pub parent: Option<NodeId>,
    /// Root of the parent chain, set once at creation.
    pub abs_parent: Option<NodeId>,

    pub title: String,
    pub tag_names: Vec<String>,
    pub body: String,

    pub added_at: DateTime<Utc>,
    pub score: i64,

    /// On a question: the accepted answer.
    pub extra_ref: Option<NodeId>,
    /// On an answer: the action that accepted it.
    pub extra_action: Option<ActionId>,
    /// On an answer: whether it is the accepted one.
    pub marked: bool,
    /// The delete action that removed this node, if any.
    pub deleted: Option<ActionId>,

    pub flag_count: u32,
    pub comment_count: u32,
    pub favorite_count: u32,

    pub active_revision: Option<RevisionId>,
    pub last_edited_at: Option<DateTime<Utc>>,
    pub last_edited_by: Option<UserId>,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub last_activity_by: Option<UserId>,

    /// Row version maintained by the store.
    #[serde(default)]
    pub version: u64,
}

impl Node {
    /// Builds an empty node under `parent`, deriving `abs_parent` from the
    /// parent's own root.
    pub(crate) fn new(
        node_type: NodeType,
        author: UserId,
        parent: Option<&Node>,
        added_at: DateTime<Utc>,
    ) -> Self {
        let abs_parent = parent.map(|p| p.absolute_parent().clone());
        Self {
            id: NodeId::generate(),
            node_type,
            author,
            parent: parent.map(|p| p.id.clone()),
            abs_parent,
            title: String::new(),
            tag_names: Vec::new(),
            body: String::new(),
            added_at,
            score: 0,
            extra_ref: None,
            extra_action: None,
            marked: false,
            deleted: None,
            flag_count: 0,
            comment_count: 0,
            favorite_count: 0,
            active_revision: None,
            last_edited_at: None,
            last_edited_by: None,
            last_activity_at: None,
            last_activity_by: None,
            version: 0,
        }
    }

    /// The root of this node's thread; a root node is its own.
    pub fn absolute_parent(&self) -> &NodeId {
        self.abs_parent.as_ref().unwrap_or(&self.id)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }

    /// Whether this answer is the accepted one.
    pub fn accepted(&self) -> bool {
        self.node_type == NodeType::Answer && self.marked
    }

    /// Tag names joined the way they were entered.
    pub fn tagnames(&self) -> String {
        self.tag_names.join(" ")
    }
}
