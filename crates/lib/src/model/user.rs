use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A forum member as seen by the ledger.
///
/// Identity and authentication live elsewhere; the ledger only needs the
/// reputation counter and the superuser bit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Always equals the sum of this user's repute rows.
    pub reputation: i64,
    #[serde(default)]
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    /// Row version maintained by the store.
    #[serde(default)]
    pub version: u64,
}

impl User {
    pub fn new(username: impl Into<String>, date_joined: DateTime<Utc>) -> Self {
        Self {
            id: UserId::generate(),
            username: username.into(),
            reputation: 0,
            is_superuser: false,
            date_joined,
            version: 0,
        }
    }
}
