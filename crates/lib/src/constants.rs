//! Constants used throughout the Quorum library.
//!
//! Central definitions for payload markers, revision summaries and other
//! fixed values that are not site configuration.

/// Delete payload marking a deletion triggered by reaching the flag threshold.
pub const BY_FLAGGED: &str = "BYFLAGGED";

/// Summary stored on a node's first revision when the author gave none.
pub const INITIAL_REVISION_SUMMARY: &str = "Initial revision";

/// Summary stored on revisions created by retagging.
pub const RETAG_SUMMARY: &str = "Retag";

/// Suffix stripped from action type names when deriving their tag.
pub const ACTION_SUFFIX: &str = "action";

/// Longest tag an action type may carry.
pub const MAX_ACTION_TYPE_LEN: usize = 16;

/// How many times a ledger operation is re-run after losing a commit race.
pub const MAX_COMMIT_RETRIES: usize = 3;
