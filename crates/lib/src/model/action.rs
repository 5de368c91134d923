use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ActionId, NodeId, UserId};

/// One user operation in the ledger.
///
/// This is the generic record for every action type; `action_type` is the tag
/// the behaviour is resolved from. Records are never edited after creation
/// except to mark them canceled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub action_type: String,
    pub user: UserId,
    pub node: Option<NodeId>,
    /// Type-specific payload (reason text, revision id, rollback range).
    pub extra: String,
    pub action_date: DateTime<Utc>,

    pub canceled: bool,
    pub canceled_by: Option<UserId>,
    pub canceled_at: Option<DateTime<Utc>>,

    /// Row version maintained by the store.
    #[serde(default)]
    pub version: u64,
}

impl Action {
    pub(crate) fn new(
        action_type: impl Into<String>,
        user: UserId,
        node: Option<NodeId>,
        extra: impl Into<String>,
        action_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActionId::generate(),
            action_type: action_type.into(),
            user,
            node,
            extra: extra.into(),
            action_date,
            canceled: false,
            canceled_by: None,
            canceled_at: None,
            version: 0,
        }
    }

    /// A live action is one that has not been canceled.
    pub fn is_live(&self) -> bool {
        !self.canceled
    }

    pub fn is_type(&self, tag: &str) -> bool {
        self.action_type == tag
    }
}
