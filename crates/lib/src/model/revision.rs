use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{NodeId, RevisionId, UserId};

/// An immutable snapshot of a node's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRevision {
    pub id: RevisionId,
    pub node: NodeId,
    /// Dense, 1-based, never reused.
    pub revision: u32,
    pub title: String,
    pub tag_names: Vec<String>,
    pub body: String,
    pub summary: String,
    pub author: UserId,
    pub revised_at: DateTime<Utc>,
    /// Row version maintained by the store.
    #[serde(default)]
    pub version: u64,
}

impl NodeRevision {
    pub(crate) fn new(
        node: NodeId,
        revision: u32,
        content: RevisionContent,
        author: UserId,
        revised_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RevisionId::generate(),
            node,
            revision,
            title: content.title,
            tag_names: dedupe_tag_names(content.tag_names),
            body: content.body,
            summary: content.summary.unwrap_or_default(),
            author,
            revised_at,
            version: 0,
        }
    }

    /// The content this revision holds, for building a derived revision.
    pub fn content(&self) -> RevisionContent {
        RevisionContent {
            title: self.title.clone(),
            tag_names: self.tag_names.clone(),
            body: self.body.clone(),
            summary: Some(self.summary.clone()),
        }
    }
}

/// Raw content fields for a new revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionContent {
    pub title: String,
    pub tag_names: Vec<String>,
    pub body: String,
    pub summary: Option<String>,
}

impl RevisionContent {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into().trim().to_string();
        self
    }

    /// Sets tags from a whitespace separated list.
    pub fn with_tags(mut self, tagnames: &str) -> Self {
        self.tag_names = parse_tag_names(tagnames);
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// Splits a whitespace separated tag list, dropping repeats.
pub fn parse_tag_names(tagnames: &str) -> Vec<String> {
    dedupe_tag_names(tagnames.split_whitespace().map(str::to_string))
}

/// Keeps the first occurrence of every name, in order.
fn dedupe_tag_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for name in names {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    unique
}
