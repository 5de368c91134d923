//! Command layer: who may do what, how often, and how toggles behave.

use quorum::{
    Settings,
    commands::{self, CommandError, DeleteOutcome, VoteDirection},
    model::RevisionContent,
};

use crate::helpers::{TestForum, command_error, open_settings};

// === Voting ===

#[test]
fn anonymous_users_cannot_vote() {
    let forum = TestForum::with_settings(open_settings());
    let author = forum.user("author");
    let q = forum.question(&author.id, "Q");

    let err = commands::vote_post(&forum.ledger, None, &q.id, VoteDirection::Up).unwrap_err();
    assert_eq!(
        command_error(&err),
        &CommandError::Unauthorized { action: "vote" }
    );
}

#[test]
fn voting_on_own_post_is_forbidden() {
    let forum = TestForum::with_settings(open_settings());
    let author = forum.user("author");
    let q = forum.question(&author.id, "Q");

    let err = commands::vote_post(&forum.ledger, Some(&author.id), &q.id, VoteDirection::Up)
        .unwrap_err();
    assert!(matches!(
        command_error(&err),
        CommandError::SelfActionForbidden { .. }
    ));
    assert_eq!(forum.reload_node(&q.id).score, 0);
}

#[test]
fn voting_requires_reputation() {
    let forum = TestForum::new();
    let author = forum.user("author");
    let q = forum.question(&author.id, "Q");
    let newcomer = forum.user("newcomer");

    let err = commands::vote_post(&forum.ledger, Some(&newcomer.id), &q.id, VoteDirection::Up)
        .unwrap_err();
    assert_eq!(
        command_error(&err),
        &CommandError::InsufficientReputation {
            action: "vote up",
            required: 15,
            reputation: 0,
        }
    );

    // Two upvotes received make 20 reputation: enough to vote up, not down.
    let regular = forum.user_with_upvotes("regular", 2);
    assert_eq!(regular.reputation, 20);
    commands::vote_post(&forum.ledger, Some(&regular.id), &q.id, VoteDirection::Up).unwrap();
    let other = forum.question(&author.id, "Other");
    let err = commands::vote_post(&forum.ledger, Some(&regular.id), &other.id, VoteDirection::Down)
        .unwrap_err();
    assert!(command_error(&err).is_permission_error());
}

#[test]
fn superusers_vote_without_reputation() {
    let forum = TestForum::new();
    let author = forum.user("author");
    let q = forum.question(&author.id, "Q");
    let admin = forum.superuser("admin");

    let outcome =
        commands::vote_post(&forum.ledger, Some(&admin.id), &q.id, VoteDirection::Down).unwrap();
    assert_eq!(outcome.state, Some(VoteDirection::Down));
    assert_eq!(forum.reputation(&author.id), -2);
    assert_eq!(forum.reputation(&admin.id), -1);
}

#[test]
fn voting_again_withdraws_the_vote() {
    let forum = TestForum::with_settings(open_settings());
    let author = forum.user("author");
    let voter = forum.user("voter");
    let q = forum.question(&author.id, "Q");

    let first =
        commands::vote_post(&forum.ledger, Some(&voter.id), &q.id, VoteDirection::Up).unwrap();
    assert_eq!(first.state, Some(VoteDirection::Up));
    assert_eq!(first.votes_left, 29);
    assert_eq!(
        commands::vote_state(&forum.ledger, &voter.id, &q.id).unwrap(),
        Some(VoteDirection::Up)
    );

    // Either direction withdraws the existing vote.
    let second =
        commands::vote_post(&forum.ledger, Some(&voter.id), &q.id, VoteDirection::Down).unwrap();
    assert_eq!(second.state, None);
    assert_eq!(second.action.id, first.action.id);
    assert_eq!(commands::vote_state(&forum.ledger, &voter.id, &q.id).unwrap(), None);
    assert_eq!(forum.reload_node(&q.id).score, 0);
    assert_eq!(forum.reputation(&author.id), 0);
    forum.assert_consistent();
}

#[test]
fn withdrawn_votes_inside_the_grace_window_leave_no_trace() {
    let forum = TestForum::with_settings(open_settings());
    let author = forum.user("author");
    let voter = forum.user("voter");
    let q = forum.question(&author.id, "Q");

    let vote =
        commands::vote_post(&forum.ledger, Some(&voter.id), &q.id, VoteDirection::Up).unwrap();
    commands::vote_post(&forum.ledger, Some(&voter.id), &q.id, VoteDirection::Up).unwrap();
    assert!(forum.ledger.action(&vote.action.id).unwrap_err().is_not_found());
    assert!(
        forum
            .ledger
            .reputes_for_action(&vote.action.id)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn withdrawn_votes_after_the_grace_window_are_canceled() {
    let forum = TestForum::with_settings(open_settings());
    let author = forum.user("author");
    let voter = forum.user("voter");
    let q = forum.question(&author.id, "Q");

    let vote =
        commands::vote_post(&forum.ledger, Some(&voter.id), &q.id, VoteDirection::Up).unwrap();
    forum.clock.advance_secs(120);
    let outcome =
        commands::vote_post(&forum.ledger, Some(&voter.id), &q.id, VoteDirection::Up).unwrap();
    assert!(outcome.action.canceled);
    assert_eq!(outcome.action.canceled_by, Some(voter.id.clone()));
    assert_eq!(forum.ledger.reputes_for_action(&vote.action.id).unwrap().len(), 2);
    assert_eq!(forum.reputation(&author.id), 0);
}

#[test]
fn old_votes_cannot_be_withdrawn() {
    let forum = TestForum::with_settings(open_settings());
    let author = forum.user("author");
    let voter = forum.user("voter");
    let q = forum.question(&author.id, "Q");

    commands::vote_post(&forum.ledger, Some(&voter.id), &q.id, VoteDirection::Up).unwrap();
    forum.clock.advance_days(2);
    let err = commands::vote_post(&forum.ledger, Some(&voter.id), &q.id, VoteDirection::Up)
        .unwrap_err();
    assert_eq!(command_error(&err), &CommandError::Stale { days: 1 });
    assert_eq!(forum.reload_node(&q.id).score, 1);
}

#[test]
fn daily_vote_limit_applies() {
    let forum = TestForum::with_settings(Settings {
        max_votes_per_day: 2,
        ..open_settings()
    });
    let author = forum.user("author");
    let voter = forum.user("voter");
    let posts: Vec<_> = (0..3)
        .map(|i| forum.question(&author.id, &format!("Q{i}")))
        .collect();

    for post in &posts[..2] {
        commands::vote_post(&forum.ledger, Some(&voter.id), &post.id, VoteDirection::Up).unwrap();
    }
    assert_eq!(commands::votes_today(&forum.ledger, &voter.id).unwrap(), 2);
    let err = commands::vote_post(&forum.ledger, Some(&voter.id), &posts[2].id, VoteDirection::Up)
        .unwrap_err();
    assert!(command_error(&err).is_rate_limited());

    forum.clock.advance_days(1);
    commands::vote_post(&forum.ledger, Some(&voter.id), &posts[2].id, VoteDirection::Up).unwrap();
}

#[test]
fn voting_on_a_missing_post_is_not_found() {
    let forum = TestForum::with_settings(open_settings());
    let voter = forum.user("voter");

    let err = commands::vote_post(
        &forum.ledger,
        Some(&voter.id),
        &quorum::NodeId::from("missing"),
        VoteDirection::Up,
    )
    .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.is_command_error());
}

// === Comments ===

#[test]
fn liking_a_comment_toggles() {
    let forum = TestForum::with_settings(open_settings());
    let author = forum.user("author");
    let fan = forum.user("fan");
    let q = forum.question(&author.id, "Q");
    let (_, comment) =
        commands::comment(&forum.ledger, Some(&author.id), &q.id, "Nice question").unwrap();

    let liked = commands::like_comment(&forum.ledger, Some(&fan.id), &comment.id).unwrap();
    assert!(liked.active);
    assert_eq!(forum.reload_node(&comment.id).score, 1);
    assert_eq!(forum.reputation(&author.id), 0);

    let unliked = commands::like_comment(&forum.ledger, Some(&fan.id), &comment.id).unwrap();
    assert!(!unliked.active);
    assert_eq!(forum.reload_node(&comment.id).score, 0);

    let err = commands::like_comment(&forum.ledger, Some(&fan.id), &q.id).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn commenting_requires_reputation_except_on_own_threads() {
    let forum = TestForum::new();
    let asker = forum.user("asker");
    let helper = forum.user("helper");
    let stranger = forum.user("stranger");
    let q = forum.question(&asker.id, "Q");
    let answer = forum.answer(&helper.id, &q.id);

    let err = commands::comment(&forum.ledger, Some(&stranger.id), &q.id, "hi").unwrap_err();
    assert!(matches!(
        command_error(&err),
        CommandError::InsufficientReputation { required: 50, .. }
    ));

    // The answer's author and the question's author may comment on the answer.
    commands::comment(&forum.ledger, Some(&helper.id), &answer.id, "Edit: fixed").unwrap();
    commands::comment(&forum.ledger, Some(&asker.id), &answer.id, "Thanks").unwrap();
    assert_eq!(forum.reload_node(&answer.id).comment_count, 2);

    let err = commands::comment(&forum.ledger, Some(&asker.id), &q.id, "   ").unwrap_err();
    assert_eq!(
        command_error(&err),
        &CommandError::ValidationFailed { field: "comment" }
    );
}

#[test]
fn only_authors_edit_comments() {
    let forum = TestForum::with_settings(open_settings());
    let author = forum.user("author");
    let other = forum.user("other");
    let q = forum.question(&author.id, "Q");
    let (_, comment) = commands::comment(&forum.ledger, Some(&author.id), &q.id, "tpyo").unwrap();

    let err = commands::edit_comment(&forum.ledger, Some(&other.id), &comment.id, "typo")
        .unwrap_err();
    assert!(matches!(command_error(&err), CommandError::NotPermitted { .. }));

    commands::edit_comment(&forum.ledger, Some(&author.id), &comment.id, "typo").unwrap();
    assert_eq!(forum.reload_node(&comment.id).body, "typo");
    assert_eq!(forum.ledger.revisions(&comment.id).unwrap().len(), 2);
}

#[test]
fn deleting_a_comment_twice_is_a_no_op() {
    let forum = TestForum::with_settings(open_settings());
    let author = forum.user("author");
    let q = forum.question(&author.id, "Q");
    let (_, comment) = commands::comment(&forum.ledger, Some(&author.id), &q.id, "oops").unwrap();

    let err =
        commands::delete_comment(&forum.ledger, Some(&author.id), &comment.id, "").unwrap_err();
    assert!(command_error(&err).is_validation_error());

    let first =
        commands::delete_comment(&forum.ledger, Some(&author.id), &comment.id, "dup").unwrap();
    assert!(first.is_some());
    let second =
        commands::delete_comment(&forum.ledger, Some(&author.id), &comment.id, "dup").unwrap();
    assert!(second.is_none());
    assert_eq!(forum.reload_node(&q.id).comment_count, 0);
}

// === Flags ===

#[test]
fn flagging_checks_duplicates_and_reasons() {
    let forum = TestForum::with_settings(open_settings());
    let author = forum.user("author");
    let flagger = forum.user("flagger");
    let q = forum.question(&author.id, "Q");

    let err = commands::flag_post(&forum.ledger, Some(&flagger.id), &q.id, "  ").unwrap_err();
    assert_eq!(
        command_error(&err),
        &CommandError::ValidationFailed { field: "reason" }
    );

    commands::flag_post(&forum.ledger, Some(&flagger.id), &q.id, "Spam").unwrap();
    let err = commands::flag_post(&forum.ledger, Some(&flagger.id), &q.id, "Other").unwrap_err();
    assert_eq!(
        command_error(&err),
        &CommandError::DuplicateAction {
            action: "flagged",
            detail: "Spam".to_string(),
        }
    );
    assert_eq!(forum.reload_node(&q.id).flag_count, 1);
    assert_eq!(forum.reputation(&author.id), -2);

    let err = commands::flag_post(&forum.ledger, Some(&author.id), &q.id, "Spam").unwrap_err();
    assert!(matches!(
        command_error(&err),
        CommandError::SelfActionForbidden { .. }
    ));
}

#[test]
fn daily_flag_limit_applies() {
    let forum = TestForum::with_settings(Settings {
        max_flags_per_day: 1,
        ..open_settings()
    });
    let author = forum.user("author");
    let flagger = forum.user("flagger");
    let first = forum.question(&author.id, "First");
    let second = forum.question(&author.id, "Second");

    commands::flag_post(&forum.ledger, Some(&flagger.id), &first.id, "Spam").unwrap();
    assert_eq!(commands::flags_today(&forum.ledger, &flagger.id).unwrap(), 1);
    let err =
        commands::flag_post(&forum.ledger, Some(&flagger.id), &second.id, "Spam").unwrap_err();
    assert_eq!(
        command_error(&err),
        &CommandError::RateLimited {
            action: "flags",
            limit: 1,
        }
    );
}

#[test]
fn enough_flags_delete_the_post() {
    let forum = TestForum::with_settings(open_settings());
    let author = forum.user("author");
    let q = forum.question(&author.id, "Q");

    for i in 0..5 {
        let flagger = forum.user(&format!("flagger{i}"));
        commands::flag_post(&forum.ledger, Some(&flagger.id), &q.id, "Spam").unwrap();
    }
    let node = forum.reload_node(&q.id);
    assert!(node.is_deleted());
    assert_eq!(forum.reputation(&author.id), -140);
    forum.assert_consistent();
}

// === Favorites and acceptance ===

#[test]
fn favorites_toggle_on_questions_only() {
    let forum = TestForum::with_settings(open_settings());
    let author = forum.user("author");
    let fan = forum.user("fan");
    let q = forum.question(&author.id, "Q");
    let answer = forum.answer(&author.id, &q.id);

    let marked = commands::mark_favorite(&forum.ledger, Some(&fan.id), &q.id).unwrap();
    assert!(marked.active);
    assert!(commands::is_favorite(&forum.ledger, &fan.id, &q.id).unwrap());
    assert_eq!(forum.reload_node(&q.id).favorite_count, 1);

    let unmarked = commands::mark_favorite(&forum.ledger, Some(&fan.id), &q.id).unwrap();
    assert!(!unmarked.active);
    assert_eq!(forum.reload_node(&q.id).favorite_count, 0);

    let err = commands::mark_favorite(&forum.ledger, Some(&fan.id), &answer.id).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn accepting_moves_between_answers() {
    let forum = TestForum::with_settings(open_settings());
    let asker = forum.user("asker");
    let first_helper = forum.user("first");
    let second_helper = forum.user("second");
    let q = forum.question(&asker.id, "Q");
    let first = forum.answer(&first_helper.id, &q.id);
    let second = forum.answer(&second_helper.id, &q.id);

    let outcome = commands::accept_answer(&forum.ledger, Some(&asker.id), &first.id).unwrap();
    assert!(outcome.accepted.is_some());
    assert!(outcome.canceled.is_empty());
    assert_eq!(forum.reputation(&first_helper.id), 15);

    let outcome = commands::accept_answer(&forum.ledger, Some(&asker.id), &second.id).unwrap();
    assert_eq!(outcome.canceled.len(), 1);
    assert_eq!(forum.reload_node(&q.id).extra_ref, Some(second.id.clone()));
    assert!(!forum.reload_node(&first.id).accepted());
    assert!(forum.reload_node(&second.id).accepted());
    assert_eq!(forum.reputation(&first_helper.id), 0);
    assert_eq!(forum.reputation(&second_helper.id), 15);
    assert_eq!(forum.reputation(&asker.id), 2);

    // Accepting the accepted answer again un-accepts it.
    let outcome = commands::accept_answer(&forum.ledger, Some(&asker.id), &second.id).unwrap();
    assert!(outcome.accepted.is_none());
    assert_eq!(forum.reload_node(&q.id).extra_ref, None);
    assert_eq!(forum.reputation(&asker.id), 0);
    forum.assert_consistent();
}

#[test]
fn only_the_asker_accepts() {
    let forum = TestForum::with_settings(open_settings());
    let asker = forum.user("asker");
    let helper = forum.user("helper");
    let q = forum.question(&asker.id, "Q");
    let answer = forum.answer(&helper.id, &q.id);

    let err = commands::accept_answer(&forum.ledger, Some(&helper.id), &answer.id).unwrap_err();
    assert!(matches!(command_error(&err), CommandError::NotPermitted { .. }));

    let admin = forum.superuser("admin");
    commands::accept_answer(&forum.ledger, Some(&admin.id), &answer.id).unwrap();
    assert!(forum.reload_node(&answer.id).accepted());
}

// === Deletion and edits ===

#[test]
fn deleting_a_deleted_post_restores_it() {
    let forum = TestForum::new();
    let author = forum.user("author");
    let stranger = forum.user("stranger");
    let q = forum.question(&author.id, "Q");

    let err = commands::delete_post(&forum.ledger, Some(&stranger.id), &q.id, "spam").unwrap_err();
    assert!(command_error(&err).is_permission_error());

    let deleted = commands::delete_post(&forum.ledger, Some(&author.id), &q.id, "dup").unwrap();
    assert!(matches!(deleted, DeleteOutcome::Deleted(_)));
    assert!(forum.reload_node(&q.id).is_deleted());

    let restored = commands::delete_post(&forum.ledger, Some(&author.id), &q.id, "").unwrap();
    assert!(matches!(restored, DeleteOutcome::Restored(_)));
    assert!(restored.action().canceled);
    assert!(!forum.reload_node(&q.id).is_deleted());
}

#[test]
fn editing_others_posts_requires_reputation() {
    let forum = TestForum::new();
    let author = forum.user("author");
    let editor = forum.user("editor");
    let q = forum.question(&author.id, "Q");
    let content = RevisionContent::new("Better body")
        .with_title("Better title")
        .with_tags("rust");

    let err = commands::edit_post(&forum.ledger, Some(&editor.id), &q.id, content.clone())
        .unwrap_err();
    assert!(matches!(
        command_error(&err),
        CommandError::InsufficientReputation { required: 2000, .. }
    ));

    let untitled = RevisionContent::new("Better body");
    let err = commands::edit_post(&forum.ledger, Some(&author.id), &q.id, untitled).unwrap_err();
    assert_eq!(
        command_error(&err),
        &CommandError::ValidationFailed { field: "title" }
    );

    commands::edit_post(&forum.ledger, Some(&author.id), &q.id, content).unwrap();
    assert_eq!(forum.reload_node(&q.id).title, "Better title");

    commands::retag_question(&forum.ledger, Some(&author.id), &q.id, "rust traits").unwrap();
    assert_eq!(forum.reload_node(&q.id).tag_names, vec!["rust", "traits"]);

    commands::rollback_post(&forum.ledger, Some(&author.id), &q.id, 1).unwrap();
    assert_eq!(forum.reload_node(&q.id).title, "Q");
}

#[test]
fn asking_requires_title_and_body() {
    let forum = TestForum::new();
    let author = forum.user("author");

    let err = commands::ask_question(
        &forum.ledger,
        Some(&author.id),
        RevisionContent::new("Body only"),
    )
    .unwrap_err();
    assert_eq!(
        command_error(&err),
        &CommandError::ValidationFailed { field: "title" }
    );

    let err = commands::ask_question(&forum.ledger, None, RevisionContent::new("b").with_title("t"))
        .unwrap_err();
    assert!(matches!(command_error(&err), CommandError::Unauthorized { .. }));

    let (action, node) = commands::ask_question(
        &forum.ledger,
        Some(&author.id),
        RevisionContent::new("b").with_title("t"),
    )
    .unwrap();
    assert_eq!(action.node, Some(node.id.clone()));
    let (_, answer) = commands::answer_question(
        &forum.ledger,
        Some(&author.id),
        &node.id,
        RevisionContent::new("self answer"),
    )
    .unwrap();
    assert_eq!(answer.parent, Some(node.id));
}
