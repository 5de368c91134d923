use std::sync::Arc;

use quorum::{
    FixedClock, Ledger, NodeId, Settings, UserId,
    actions::VoteUpAction,
    model::{Node, RevisionContent, User},
    store::InMemory,
};

/// A ledger over a fresh in-memory store with a controllable clock.
pub struct TestForum {
    pub ledger: Ledger,
    pub clock: Arc<FixedClock>,
    pub store: Arc<InMemory>,
}

impl TestForum {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let clock = Arc::new(FixedClock::default());
        let store = Arc::new(InMemory::new());
        let ledger = Ledger::open_with_clock(store.clone(), settings, clock.clone())
            .expect("Failed to open ledger");
        Self {
            ledger,
            clock,
            store,
        }
    }

    pub fn user(&self, username: &str) -> User {
        self.ledger
            .register_user(username)
            .expect("Failed to register user")
    }

    pub fn superuser(&self, username: &str) -> User {
        let user = self.user(username);
        self.ledger
            .set_superuser(&user.id, true)
            .expect("Failed to grant superuser")
    }

    /// Registers a user and has `upvotes` other users vote up one of their
    /// questions, so the reputation is earned through real rows.
    pub fn user_with_upvotes(&self, username: &str, upvotes: usize) -> User {
        let user = self.user(username);
        let question = self.question(&user.id, &format!("Question by {username}"));
        for i in 0..upvotes {
            let fan = self.user(&format!("{username}-fan{i}"));
            self.ledger
                .create::<VoteUpAction>(&fan.id, Some(&question.id), "")
                .expect("Failed to vote up");
        }
        self.reload_user(&user.id)
    }

    pub fn question(&self, author: &UserId, title: &str) -> Node {
        let content = RevisionContent::new(format!("Body of {title}"))
            .with_title(title)
            .with_tags("rust");
        self.ledger
            .ask(author, content)
            .expect("Failed to ask question")
            .1
    }

    pub fn answer(&self, author: &UserId, question: &NodeId) -> Node {
        self.ledger
            .answer(author, question, RevisionContent::new("An answer"))
            .expect("Failed to answer")
            .1
    }

    pub fn reload_user(&self, id: &UserId) -> User {
        self.ledger.user(id).expect("Failed to load user")
    }

    pub fn reload_node(&self, id: &NodeId) -> Node {
        self.ledger.node(id).expect("Failed to load node")
    }

    pub fn reputation(&self, id: &UserId) -> i64 {
        self.reload_user(id).reputation
    }

    /// Asserts every reputation counter matches its rows.
    pub fn assert_consistent(&self) {
        let mismatches = self.ledger.audit_reputation().expect("Failed to audit");
        assert!(mismatches.is_empty(), "reputation drift: {mismatches:?}");
    }
}

/// Settings with every reputation gate opened.
pub fn open_settings() -> Settings {
    Settings {
        rep_to_vote_up: 0,
        rep_to_vote_down: 0,
        rep_to_flag: 0,
        rep_to_comment: 0,
        rep_to_like_comment: 0,
        rep_to_delete_comments: 0,
        rep_to_delete_others_posts: 0,
        rep_to_edit_others_posts: 0,
        ..Settings::default()
    }
}

/// The command error behind `err`, panicking if it is something else.
pub fn command_error(err: &quorum::Error) -> &quorum::commands::CommandError {
    err.as_command_error()
        .unwrap_or_else(|| panic!("expected a command error, got {err:?}"))
}
