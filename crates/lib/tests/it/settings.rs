//! Settings files and their effect on a running ledger.

use std::sync::Arc;

use quorum::{Ledger, Settings, actions::VoteDownAction, store::InMemory};

use crate::helpers::TestForum;

#[test]
fn settings_file_overrides_amounts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{"REP_LOST_BY_DOWNVOTED": 5, "REP_LOST_BY_DOWNVOTING": 0}"#,
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    let forum = TestForum::with_settings(settings);
    let author = forum.user("author");
    let voter = forum.user("voter");
    let q = forum.question(&author.id, "Q");

    let vote = forum
        .ledger
        .create::<VoteDownAction>(&voter.id, Some(&q.id), "")
        .unwrap();
    assert_eq!(forum.reputation(&author.id), -5);
    // A zero amount writes no row at all.
    assert_eq!(forum.reputation(&voter.id), 0);
    assert_eq!(forum.ledger.reputes_for_action(&vote.id).unwrap().len(), 1);
}

#[test]
fn malformed_settings_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = Settings::load(&path).unwrap_err();
    assert!(err.is_settings_error());
    assert_eq!(err.module(), "settings");
}

#[test]
fn ledgers_refuse_invalid_settings() {
    let settings = Settings {
        cancel_grace_seconds: -1,
        ..Settings::default()
    };
    let err = Ledger::open(Arc::new(InMemory::new()), settings).unwrap_err();
    assert!(err.is_settings_error());
}
