use std::sync::{Arc, Mutex};

use super::*;
use crate::{
    actions::{AcceptAnswerAction, DeleteAction, FavoriteAction, FlagAction, VoteDownAction, VoteUpAction},
    clock::FixedClock,
    constants::BY_FLAGGED,
    store::InMemory,
};

fn setup() -> (Ledger, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::default());
    let ledger = Ledger::open_with_clock(
        Arc::new(InMemory::new()),
        Settings::default(),
        clock.clone(),
    )
    .unwrap();
    (ledger, clock)
}

fn question(ledger: &Ledger, author: &UserId) -> Node {
    let content = RevisionContent::new("How do lifetimes work?")
        .with_title("Lifetimes")
        .with_tags("rust borrowck");
    ledger.ask(author, content).unwrap().1
}

fn reputation(ledger: &Ledger, user: &UserId) -> i64 {
    ledger.user(user).unwrap().reputation
}

#[test]
fn vote_up_grants_and_cancel_reverses() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let voter = ledger.register_user("voter").unwrap();
    let q = question(&ledger, &author.id);

    let vote = ledger.create::<VoteUpAction>(&voter.id, Some(&q.id), "").unwrap();
    assert_eq!(reputation(&ledger, &author.id), 10);
    assert_eq!(ledger.node(&q.id).unwrap().score, 1);

    let canceled = ledger.cancel(&vote.id, None).unwrap();
    assert!(canceled.canceled);
    assert_eq!(canceled.canceled_by, Some(voter.id.clone()));
    assert_eq!(reputation(&ledger, &author.id), 0);
    assert_eq!(ledger.node(&q.id).unwrap().score, 0);

    let rows = ledger.reputes_for_action(&vote.id).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows.iter().filter(|r| r.by_canceled).count(), 1);
    assert!(ledger.audit_reputation().unwrap().is_empty());
}

#[test]
fn vote_down_costs_author_and_voter() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let voter = ledger.register_user("voter").unwrap();
    let q = question(&ledger, &author.id);

    ledger.create::<VoteDownAction>(&voter.id, Some(&q.id), "").unwrap();
    assert_eq!(reputation(&ledger, &author.id), -2);
    assert_eq!(reputation(&ledger, &voter.id), -1);
    assert_eq!(ledger.node(&q.id).unwrap().score, -1);
}

#[test]
fn canceling_twice_changes_nothing() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let voter = ledger.register_user("voter").unwrap();
    let q = question(&ledger, &author.id);

    let vote = ledger.create::<VoteUpAction>(&voter.id, Some(&q.id), "").unwrap();
    let first = ledger.cancel(&vote.id, None).unwrap();
    let second = ledger.cancel(&vote.id, None).unwrap();
    assert_eq!(first, second);
    assert_eq!(reputation(&ledger, &author.id), 0);
    assert_eq!(ledger.reputes_for_action(&vote.id).unwrap().len(), 2);
}

#[test]
fn cancel_or_delete_removes_young_actions() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let voter = ledger.register_user("voter").unwrap();
    let q = question(&ledger, &author.id);

    let vote = ledger.create::<VoteUpAction>(&voter.id, Some(&q.id), "").unwrap();
    let outcome = ledger.cancel_or_delete(&vote.id, None).unwrap();
    assert!(outcome.was_deleted());
    assert!(ledger.action(&vote.id).unwrap_err().is_not_found());
    assert!(ledger.reputes_for_action(&vote.id).unwrap().is_empty());
    assert_eq!(reputation(&ledger, &author.id), 0);
    assert_eq!(ledger.node(&q.id).unwrap().score, 0);
}

#[test]
fn cancel_or_delete_cancels_old_actions() {
    let (ledger, clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let voter = ledger.register_user("voter").unwrap();
    let q = question(&ledger, &author.id);

    let vote = ledger.create::<VoteUpAction>(&voter.id, Some(&q.id), "").unwrap();
    clock.advance_secs(61);
    let outcome = ledger.cancel_or_delete(&vote.id, None).unwrap();
    assert!(!outcome.was_deleted());
    assert!(outcome.action().canceled);
    assert!(ledger.action(&vote.id).unwrap().canceled);
    assert_eq!(reputation(&ledger, &author.id), 0);
}

#[test]
fn toggling_creates_then_undoes() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let fan = ledger.register_user("fan").unwrap();
    let q = question(&ledger, &author.id);

    let (_, created) = ledger.create_or_cancel::<FavoriteAction>(&fan.id, &q.id, "").unwrap();
    assert!(created);
    assert_eq!(ledger.node(&q.id).unwrap().favorite_count, 1);

    let (_, created) = ledger.create_or_cancel::<FavoriteAction>(&fan.id, &q.id, "").unwrap();
    assert!(!created);
    assert_eq!(ledger.node(&q.id).unwrap().favorite_count, 0);
    assert!(
        ledger
            .find_current(&[FavoriteAction::type_tag()], &q.id, &fan.id)
            .unwrap()
            .is_none()
    );
}

#[test]
fn favorite_recount_is_idempotent() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let fan = ledger.register_user("fan").unwrap();
    let critic = ledger.register_user("critic").unwrap();
    let q = question(&ledger, &author.id);

    let kept = ledger.create::<FavoriteAction>(&fan.id, Some(&q.id), "").unwrap();
    let dropped = ledger
        .create::<FavoriteAction>(&critic.id, Some(&q.id), "")
        .unwrap();
    assert_eq!(ledger.node(&q.id).unwrap().favorite_count, 2);
    ledger.cancel(&dropped.id, None).unwrap();
    assert_eq!(ledger.node(&q.id).unwrap().favorite_count, 1);

    let kind = ledger.registry().resolve(&FavoriteAction::type_tag());
    let favorite = ledger.action(&kept.id).unwrap();
    ledger
        .run("recount_favorites", |tx| {
            let mut ctx = ActionContext::new(tx, favorite.clone());
            kind.process_action(&mut ctx)?;
            kind.process_action(&mut ctx)
        })
        .unwrap();
    assert_eq!(ledger.node(&q.id).unwrap().favorite_count, 1);
}

#[test]
fn get_current_reports_missing_actions() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let q = question(&ledger, &author.id);

    let err = ledger
        .get_current(&[VoteUpAction::type_tag()], &q.id, &author.id)
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn flags_hide_then_delete() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let q = question(&ledger, &author.id);

    let mut flaggers = Vec::new();
    for i in 0..5 {
        let flagger = ledger.register_user(&format!("flagger{i}")).unwrap();
        ledger
            .create::<FlagAction>(&flagger.id, Some(&q.id), "Spam")
            .unwrap();
        flaggers.push(flagger);
        if i == 2 {
            assert_eq!(reputation(&ledger, &author.id), -3 * 2 - 30);
        }
        if i < 4 {
            assert!(!ledger.node(&q.id).unwrap().is_deleted());
        }
    }

    let node = ledger.node(&q.id).unwrap();
    assert_eq!(node.flag_count, 5);
    assert_eq!(reputation(&ledger, &author.id), -5 * 2 - 30 - 100);

    let delete_id = node.deleted.clone().unwrap();
    let delete = ledger.action(&delete_id).unwrap();
    assert!(delete.is_type(&DeleteAction::type_tag()));
    assert_eq!(delete.extra, BY_FLAGGED);
    assert_eq!(delete.user, flaggers[4].id);

    let description = ledger.describe(&delete_id).unwrap();
    assert_eq!(
        description.reason.as_deref(),
        Some("flagged by multiple users: Spam; Spam; Spam; Spam; Spam")
    );
    assert!(ledger.audit_reputation().unwrap().is_empty());

    // A sixth flag passes both thresholds without another delete.
    let late = ledger.register_user("late").unwrap();
    ledger
        .create::<FlagAction>(&late.id, Some(&q.id), "Spam")
        .unwrap();
    let deletes = ledger
        .actions(&ActionFilter::new().action_type(DeleteAction::type_tag()))
        .unwrap();
    assert_eq!(deletes.len(), 1);
    assert_eq!(reputation(&ledger, &author.id), -6 * 2 - 30 - 100);
}

#[test]
fn flag_delete_reason_lists_only_live_flags() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let q = question(&ledger, &author.id);

    let hesitant = ledger.register_user("hesitant").unwrap();
    let retracted = ledger
        .create::<FlagAction>(&hesitant.id, Some(&q.id), "Retracted")
        .unwrap();
    ledger.cancel(&retracted.id, None).unwrap();

    for i in 0..5 {
        let flagger = ledger.register_user(&format!("flagger{i}")).unwrap();
        ledger
            .create::<FlagAction>(&flagger.id, Some(&q.id), "Spam")
            .unwrap();
    }

    let node = ledger.node(&q.id).unwrap();
    assert_eq!(node.flag_count, 5);
    let description = ledger.describe(&node.deleted.unwrap()).unwrap();
    assert_eq!(
        description.reason.as_deref(),
        Some("flagged by multiple users: Spam; Spam; Spam; Spam; Spam")
    );
}

#[test]
fn canceling_a_flag_recounts() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let flagger = ledger.register_user("flagger").unwrap();
    let q = question(&ledger, &author.id);

    let flag = ledger
        .create::<FlagAction>(&flagger.id, Some(&q.id), "Spam")
        .unwrap();
    assert_eq!(ledger.node(&q.id).unwrap().flag_count, 1);
    ledger.cancel(&flag.id, None).unwrap();
    assert_eq!(ledger.node(&q.id).unwrap().flag_count, 0);
    assert_eq!(reputation(&ledger, &author.id), 0);
}

#[test]
fn accepting_an_answer_rewards_both_sides() {
    let (ledger, _clock) = setup();
    let asker = ledger.register_user("asker").unwrap();
    let helper = ledger.register_user("helper").unwrap();
    let q = question(&ledger, &asker.id);
    let (_, answer) = ledger
        .answer(&helper.id, &q.id, RevisionContent::new("Use 'a"))
        .unwrap();

    let accept = ledger
        .create::<AcceptAnswerAction>(&asker.id, Some(&answer.id), "")
        .unwrap();
    assert_eq!(reputation(&ledger, &asker.id), 2);
    assert_eq!(reputation(&ledger, &helper.id), 15);
    assert_eq!(ledger.node(&q.id).unwrap().extra_ref, Some(answer.id.clone()));
    let marked = ledger.node(&answer.id).unwrap();
    assert!(marked.accepted());
    assert_eq!(marked.extra_action, Some(accept.id.clone()));

    ledger.cancel(&accept.id, None).unwrap();
    assert_eq!(reputation(&ledger, &asker.id), 0);
    assert_eq!(reputation(&ledger, &helper.id), 0);
    assert_eq!(ledger.node(&q.id).unwrap().extra_ref, None);
    assert!(!ledger.node(&answer.id).unwrap().accepted());
}

#[test]
fn accepting_your_own_answer_grants_nothing() {
    let (ledger, _clock) = setup();
    let asker = ledger.register_user("asker").unwrap();
    let q = question(&ledger, &asker.id);
    let (_, answer) = ledger
        .answer(&asker.id, &q.id, RevisionContent::new("Figured it out"))
        .unwrap();

    let accept = ledger
        .create::<AcceptAnswerAction>(&asker.id, Some(&answer.id), "")
        .unwrap();
    assert!(ledger.node(&answer.id).unwrap().accepted());
    assert_eq!(ledger.node(&q.id).unwrap().extra_ref, Some(answer.id.clone()));
    assert_eq!(reputation(&ledger, &asker.id), 0);
    assert!(ledger.reputes_for_action(&accept.id).unwrap().is_empty());

    ledger.cancel(&accept.id, None).unwrap();
    assert_eq!(reputation(&ledger, &asker.id), 0);
    assert!(ledger.reputes_for_action(&accept.id).unwrap().is_empty());
    assert!(ledger.audit_reputation().unwrap().is_empty());
}

#[test]
fn accepting_a_question_is_rejected() {
    let (ledger, _clock) = setup();
    let asker = ledger.register_user("asker").unwrap();
    let q = question(&ledger, &asker.id);

    let err = ledger
        .create::<AcceptAnswerAction>(&asker.id, Some(&q.id), "")
        .unwrap_err();
    assert!(matches!(
        err,
        crate::Error::Ledger(LedgerError::InvalidTarget { .. })
    ));
    assert!(
        ledger
            .actions(&ActionFilter::new().action_type(AcceptAnswerAction::type_tag()))
            .unwrap()
            .is_empty()
    );
}

#[test]
fn deleting_and_restoring_a_comment_updates_the_count() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let q = question(&ledger, &author.id);
    let (_, comment) = ledger.comment(&author.id, &q.id, "First!").unwrap();
    assert_eq!(ledger.node(&q.id).unwrap().comment_count, 1);

    let delete = ledger
        .create::<DeleteAction>(&author.id, Some(&comment.id), "noise")
        .unwrap();
    assert!(ledger.node(&comment.id).unwrap().is_deleted());
    assert_eq!(ledger.node(&q.id).unwrap().comment_count, 0);

    ledger.cancel(&delete.id, None).unwrap();
    assert!(!ledger.node(&comment.id).unwrap().is_deleted());
    assert_eq!(ledger.node(&q.id).unwrap().comment_count, 1);
}

#[test]
fn revisions_number_up_and_roll_back() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let editor = ledger.register_user("editor").unwrap();
    let q = question(&ledger, &author.id);
    assert!(q.last_edited_at.is_none());

    let (_, second) = ledger
        .revise(
            &editor.id,
            &q.id,
            RevisionContent::new("Lifetimes name scopes.")
                .with_title("Lifetimes explained")
                .with_tags("rust"),
        )
        .unwrap();
    assert_eq!(second.revision, 2);
    let edited = ledger.node(&q.id).unwrap();
    assert_eq!(edited.title, "Lifetimes explained");
    assert_eq!(edited.last_edited_by, Some(editor.id.clone()));
    assert_eq!(edited.active_revision, Some(second.id.clone()));

    let rollback = ledger.rollback(&author.id, &q.id, 1).unwrap();
    let restored = ledger.node(&q.id).unwrap();
    assert_eq!(restored.title, "Lifetimes");
    assert_eq!(restored.tag_names, vec!["rust", "borrowck"]);
    assert_eq!(ledger.revisions(&q.id).unwrap().len(), 2);
    assert_eq!(rollback.extra, "2:1");

    // Rolling back never reuses numbers.
    let (_, third) = ledger
        .revise(&author.id, &q.id, RevisionContent::new("Again").with_title("Lifetimes"))
        .unwrap();
    assert_eq!(third.revision, 3);
}

#[test]
fn rollback_to_a_missing_revision_fails() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let q = question(&ledger, &author.id);

    let err = ledger.rollback(&author.id, &q.id, 7).unwrap_err();
    assert!(matches!(
        err,
        crate::Error::Ledger(LedgerError::RevisionNotFound { revision: 7, .. })
    ));
}

#[test]
fn tag_counts_follow_revisions() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let q = question(&ledger, &author.id);
    assert_eq!(ledger.tag("rust").unwrap().unwrap().used_count, 1);
    assert_eq!(ledger.tag("borrowck").unwrap().unwrap().used_count, 1);

    ledger.retag(&author.id, &q.id, "rust async").unwrap();
    let borrowck = ledger.tag("borrowck").unwrap().unwrap();
    assert_eq!(borrowck.used_count, 0);
    assert!(borrowck.deleted);
    assert_eq!(ledger.tag("async").unwrap().unwrap().used_count, 1);
    assert_eq!(ledger.tag("rust").unwrap().unwrap().used_count, 1);

    ledger.retag(&author.id, &q.id, "rust borrowck").unwrap();
    let borrowck = ledger.tag("borrowck").unwrap().unwrap();
    assert_eq!(borrowck.used_count, 1);
    assert!(!borrowck.deleted);
}

#[test]
fn repeated_tag_names_count_once() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let content = RevisionContent {
        tag_names: vec!["rust".to_string(), "rust".to_string()],
        ..RevisionContent::new("Twice tagged").with_title("Repeats")
    };

    let (_, q) = ledger.ask(&author.id, content).unwrap();
    assert_eq!(q.tag_names, vec!["rust"]);
    assert_eq!(ledger.tag("rust").unwrap().unwrap().used_count, 1);

    ledger.retag(&author.id, &q.id, "async").unwrap();
    let rust = ledger.tag("rust").unwrap().unwrap();
    assert_eq!(rust.used_count, 0);
    assert!(rust.deleted);
}

#[test]
fn unknown_tags_are_rejected_on_create() {
    let (ledger, _clock) = setup();
    let user = ledger.register_user("user").unwrap();

    let err = ledger
        .create_by_tag("bogus", &user.id, None, "", &ActionData::None)
        .unwrap_err();
    assert!(err.is_invariant_violation());
}

#[test]
fn events_follow_commits() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();
    let voter = ledger.register_user("voter").unwrap();
    let q = question(&ledger, &author.id);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    ledger.subscribe(move |event| {
        sink.lock().unwrap().push(event.kind());
        Ok(())
    });

    let vote = ledger.create::<VoteUpAction>(&voter.id, Some(&q.id), "").unwrap();
    ledger.cancel(&vote.id, None).unwrap();
    let _ = ledger.create_by_tag("bogus", &voter.id, None, "", &ActionData::None);

    assert_eq!(
        *seen.lock().unwrap(),
        vec!["action_created", "action_canceled"]
    );
}

#[test]
fn failing_subscribers_do_not_block_others() {
    let (ledger, _clock) = setup();
    let author = ledger.register_user("author").unwrap();

    let seen = Arc::new(Mutex::new(0));
    let sink = seen.clone();
    ledger.subscribe(|_| Err(LedgerError::invariant("subscriber failed").into()));
    ledger.subscribe(move |_| {
        *sink.lock().unwrap() += 1;
        Ok(())
    });

    question(&ledger, &author.id);
    // ask: node created, action created
    assert_eq!(*seen.lock().unwrap(), 2);
}

#[test]
fn activity_bubbles_to_the_question() {
    let (ledger, clock) = setup();
    let asker = ledger.register_user("asker").unwrap();
    let helper = ledger.register_user("helper").unwrap();
    let q = question(&ledger, &asker.id);

    clock.advance_secs(30);
    let (_, answer) = ledger
        .answer(&helper.id, &q.id, RevisionContent::new("Use 'a"))
        .unwrap();
    let (_, comment) = ledger.comment(&asker.id, &answer.id, "Thanks").unwrap();

    let q = ledger.node(&q.id).unwrap();
    assert_eq!(comment.abs_parent, Some(q.id.clone()));
    assert_eq!(q.last_activity_by, Some(asker.id.clone()));
    assert_eq!(q.last_activity_at, comment.last_activity_at);
    assert_eq!(ledger.node(&answer.id).unwrap().comment_count, 1);
}
