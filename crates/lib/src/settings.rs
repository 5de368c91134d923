//! Site configuration consumed by the ledger and the command layer.
//!
//! All reputation amounts and thresholds live here. Field names serialize in
//! `SCREAMING_SNAKE_CASE`, so a settings file uses the same names operators
//! know (`REP_GAIN_BY_UPVOTED`, `FLAG_COUNT_TO_DELETE_POST`, ...). Every field
//! has a default; a file only needs to list the values it overrides.

use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reputation amounts, moderation thresholds and daily limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Settings {
    /// Granted to a post's author for each up vote.
    pub rep_gain_by_upvoted: i64,
    /// Taken from a post's author for each down vote.
    pub rep_lost_by_downvoted: i64,
    /// Taken from the voter for each down vote cast.
    pub rep_lost_by_downvoting: i64,
    /// Granted to the user accepting an answer.
    pub rep_gain_by_accepting: i64,
    /// Granted to the author of an accepted answer.
    pub rep_gain_by_accepted: i64,
    /// Taken from a post's author for each flag.
    pub rep_lost_by_flagged: i64,
    /// Extra penalty when the flag count reaches the hide threshold.
    pub rep_lost_by_flagged_3_times: i64,
    /// Extra penalty when the flag count reaches the delete threshold.
    pub rep_lost_by_flagged_5_times: i64,

    /// Flag count at which a post is hidden.
    pub flag_count_to_hide_post: u32,
    /// Flag count at which a post is deleted automatically.
    pub flag_count_to_delete_post: u32,

    pub max_votes_per_day: u32,
    pub max_flags_per_day: u32,
    /// Votes older than this many days can no longer be canceled.
    pub deny_unvote_days: i64,

    pub rep_to_vote_up: i64,
    pub rep_to_vote_down: i64,
    pub rep_to_flag: i64,
    pub rep_to_comment: i64,
    pub rep_to_like_comment: i64,
    pub rep_to_delete_comments: i64,
    pub rep_to_delete_others_posts: i64,
    pub rep_to_edit_others_posts: i64,

    /// Cancel-or-delete hard deletes actions younger than this.
    pub cancel_grace_seconds: i64,

    /// Reasons offered when flagging a post.
    pub flag_types: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rep_gain_by_upvoted: 10,
            rep_lost_by_downvoted: 2,
            rep_lost_by_downvoting: 1,
            rep_gain_by_accepting: 2,
            rep_gain_by_accepted: 15,
            rep_lost_by_flagged: 2,
            rep_lost_by_flagged_3_times: 30,
            rep_lost_by_flagged_5_times: 100,
            flag_count_to_hide_post: 3,
            flag_count_to_delete_post: 5,
            max_votes_per_day: 30,
            max_flags_per_day: 5,
            deny_unvote_days: 1,
            rep_to_vote_up: 15,
            rep_to_vote_down: 100,
            rep_to_flag: 15,
            rep_to_comment: 50,
            rep_to_like_comment: 15,
            rep_to_delete_comments: 2000,
            rep_to_delete_others_posts: 750,
            rep_to_edit_others_posts: 2000,
            cancel_grace_seconds: 60,
            flag_types: [
                "Spam",
                "Advertising",
                "Offensive, Abusive, or Inappropriate",
                "Content violates terms of use",
                "Copyright Violation",
                "Misleading",
                "Someone is not being nice",
                "Not relevant/off-topic",
                "Other",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl Settings {
    /// Parses settings from a JSON document and validates them.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let settings: Settings = serde_json::from_str(json)
            .map_err(|source| SettingsError::ParseFailed { source })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a JSON file.
    ///
    /// A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(json) => Self::from_json_str(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(SettingsError::FileIo {
                path: path.as_ref().display().to_string(),
                source,
            }
            .into()),
        }
    }

    /// Checks that thresholds are usable.
    pub fn validate(&self) -> crate::Result<()> {
        if self.flag_count_to_hide_post == 0 {
            return Err(SettingsError::InvalidValue {
                name: "FLAG_COUNT_TO_HIDE_POST",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.flag_count_to_delete_post <= self.flag_count_to_hide_post {
            return Err(SettingsError::InvalidValue {
                name: "FLAG_COUNT_TO_DELETE_POST",
                reason: format!(
                    "must be above FLAG_COUNT_TO_HIDE_POST ({})",
                    self.flag_count_to_hide_post
                ),
            }
            .into());
        }
        if self.cancel_grace_seconds < 0 {
            return Err(SettingsError::InvalidValue {
                name: "CANCEL_GRACE_SECONDS",
                reason: "must not be negative".to_string(),
            }
            .into());
        }
        if self.deny_unvote_days < 0 {
            return Err(SettingsError::InvalidValue {
                name: "DENY_UNVOTE_DAYS",
                reason: "must not be negative".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Window during which cancel-or-delete removes an action outright.
    pub fn grace_window(&self) -> Duration {
        Duration::seconds(self.cancel_grace_seconds)
    }

    /// Age after which a vote can no longer be canceled.
    pub fn unvote_deadline(&self) -> Duration {
        Duration::days(self.deny_unvote_days)
    }
}

/// Errors raised while loading or validating [`Settings`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings document is not valid JSON for [`Settings`].
    #[error("Failed to parse settings")]
    ParseFailed {
        #[source]
        source: serde_json::Error,
    },

    /// The settings file could not be read.
    #[error("Failed to read settings file {path}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A value is outside its allowed range.
    #[error("Invalid setting {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

impl SettingsError {
    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(self, SettingsError::FileIo { .. })
    }
}

impl From<SettingsError> for crate::Error {
    fn from(err: SettingsError) -> Self {
        crate::Error::Settings(err)
    }
}
