//! Ledger behaviour through the public API: persistence, concurrent writers,
//! event channels and unknown action types.

use std::{sync::Arc, thread};

use quorum::{
    Ledger, Settings,
    actions::{ActionData, ActionKind, ActionType, FavoriteAction, FlagAction, VoteUpAction},
    ledger::{LedgerError, LedgerEvent},
    store::{ActionFilter, InMemory},
};

use crate::helpers::TestForum;

#[test]
fn state_survives_a_save_and_load() {
    let forum = TestForum::new();
    let author = forum.user("author");
    let voter = forum.user("voter");
    let q = forum.question(&author.id, "Persisted");
    let vote = forum
        .ledger
        .create::<VoteUpAction>(&voter.id, Some(&q.id), "")
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forum.json");
    forum.store.save_to_file(&path).unwrap();

    let loaded = Arc::new(InMemory::load_from_file(&path).unwrap());
    assert_eq!(loaded.record_count(), forum.store.record_count());
    let ledger = Ledger::open(loaded, Settings::default()).unwrap();

    assert_eq!(ledger.user(&author.id).unwrap().reputation, 10);
    assert_eq!(ledger.node(&q.id).unwrap().title, "Persisted");
    assert_eq!(ledger.tag("rust").unwrap().unwrap().used_count, 1);

    // Reversal still works on reloaded records.
    ledger.cancel(&vote.id, None).unwrap();
    assert_eq!(ledger.user(&author.id).unwrap().reputation, 0);
    assert!(ledger.audit_reputation().unwrap().is_empty());
}

#[test]
fn concurrent_votes_keep_reputation_consistent() {
    let forum = TestForum::new();
    let author = forum.user("author");
    let q = forum.question(&author.id, "Popular");
    let voters: Vec<_> = (0..8).map(|i| forum.user(&format!("voter{i}"))).collect();

    let handles: Vec<_> = voters
        .into_iter()
        .map(|voter| {
            let ledger = forum.ledger.clone();
            let node = q.id.clone();
            thread::spawn(move || ledger.create::<VoteUpAction>(&voter.id, Some(&node), ""))
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(_) => created += 1,
            // Heavy contention may exhaust the retries; nothing may be half-applied.
            Err(e) => assert!(
                matches!(e, quorum::Error::Ledger(LedgerError::RetriesExhausted { .. })),
                "unexpected error: {e}"
            ),
        }
    }

    assert!(created > 0);
    assert_eq!(forum.reputation(&author.id), 10 * created);
    assert_eq!(forum.reload_node(&q.id).score, created);
    forum.assert_consistent();
}

#[test]
fn channel_subscribers_see_committed_events() {
    let forum = TestForum::new();
    let author = forum.user("author");
    let fan = forum.user("fan");
    let q = forum.question(&author.id, "Q");

    let events = forum.ledger.events().subscribe_channel();
    forum
        .ledger
        .create_or_cancel::<FavoriteAction>(&fan.id, &q.id, "")
        .unwrap();
    forum
        .ledger
        .create_or_cancel::<FavoriteAction>(&fan.id, &q.id, "")
        .unwrap();

    let received: Vec<LedgerEvent> = events.try_iter().collect();
    assert_eq!(received.len(), 2);
    assert!(matches!(received[0], LedgerEvent::ActionCreated(_)));
    assert!(matches!(received[1], LedgerEvent::ActionDeleted(_)));
    assert_eq!(received[1].node_id(), Some(&q.id));
}

#[test]
fn unknown_types_are_rejected_but_resolve_for_display() {
    let forum = TestForum::new();
    let user = forum.user("user");
    let flag_tag = FlagAction::type_tag();

    assert!(forum.ledger.registry().contains(&flag_tag));
    assert!(!forum.ledger.registry().contains("legacy"));

    let err = forum
        .ledger
        .create_by_tag("legacy", &user.id, None, "", &ActionData::None)
        .unwrap_err();
    assert!(err.is_invariant_violation());
    assert!(
        forum
            .ledger
            .actions(&ActionFilter::new().user(&user.id))
            .unwrap()
            .is_empty()
    );

    // Records written under a retired tag still resolve, to the inert base.
    let q = forum.question(&user.id, "Q");
    let mut legacy = forum
        .ledger
        .create::<FavoriteAction>(&user.id, Some(&q.id), "")
        .unwrap();
    legacy.action_type = "legacy".to_string();
    let kind = forum.ledger.resolve(&legacy);
    assert!(!kind.requires_node());
    assert_eq!(kind.verb(), "acted on");
}

#[test]
fn history_describes_actions() {
    let forum = TestForum::new();
    let author = forum.user("ada");
    let flagger = forum.user("grace");
    let q = forum.question(&author.id, "Pinning");
    let flag = forum
        .ledger
        .create::<FlagAction>(&flagger.id, Some(&q.id), "Off-topic")
        .unwrap();

    let description = forum.ledger.describe(&flag.id).unwrap();
    assert_eq!(description.to_string(), "grace flagged \"Pinning\": Off-topic");

    let asked = forum
        .ledger
        .actions(&ActionFilter::new().user(&author.id).live())
        .unwrap();
    assert_eq!(asked.len(), 1);
    assert_eq!(
        forum.ledger.describe(&asked[0].id).unwrap().to_string(),
        "ada asked \"Pinning\""
    );
}
