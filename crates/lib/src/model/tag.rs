use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A tag and how many nodes currently list it.
///
/// Tags are soft deleted when their count reaches zero and come back when a
/// node lists them again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub used_count: u32,
    pub deleted: bool,
    pub deleted_by: Option<UserId>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    /// Row version maintained by the store.
    #[serde(default)]
    pub version: u64,
}

impl Tag {
    pub(crate) fn new(name: impl Into<String>, created_by: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            used_count: 0,
            deleted: false,
            deleted_by: None,
            deleted_at: None,
            created_by,
            created_at,
            version: 0,
        }
    }

    pub(crate) fn mark_deleted(&mut self, by: UserId, at: DateTime<Utc>) {
        self.deleted = true;
        self.deleted_by = Some(by);
        self.deleted_at = Some(at);
    }

    pub(crate) fn unmark_deleted(&mut self) {
        self.deleted = false;
        self.deleted_by = None;
        self.deleted_at = None;
    }
}
