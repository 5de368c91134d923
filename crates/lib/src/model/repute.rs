use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ActionId, ReputeId, UserId};

use super::Action;

/// One signed reputation delta granted to a user by an action.
///
/// Reversal rows (`by_canceled`) are added on cancellation; original rows are
/// never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRepute {
    pub id: ReputeId,
    pub action: ActionId,
    pub user: UserId,
    pub value: i64,
    pub by_canceled: bool,
    /// Row version maintained by the store.
    #[serde(default)]
    pub version: u64,
}

impl ActionRepute {
    pub(crate) fn new(action: ActionId, user: UserId, value: i64, by_canceled: bool) -> Self {
        Self {
            id: ReputeId::generate(),
            action,
            user,
            value,
            by_canceled,
            version: 0,
        }
    }

    pub fn positive(&self) -> i64 {
        self.value.max(0)
    }

    pub fn negative(&self) -> i64 {
        self.value.min(0)
    }

    /// When the delta took effect: the cancellation time for reversal rows,
    /// the action date otherwise.
    pub fn reputed_at(&self, action: &Action) -> DateTime<Utc> {
        if self.by_canceled {
            action.canceled_at.unwrap_or(action.action_date)
        } else {
            action.action_date
        }
    }
}
