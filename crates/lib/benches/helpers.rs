//! Shared helpers for benchmark tests

use std::sync::Arc;

use quorum::{
    Ledger, NodeId, Settings, UserId, actions::VoteUpAction, model::RevisionContent,
    store::InMemory,
};

pub struct BenchForum {
    pub ledger: Ledger,
    pub question: NodeId,
    /// A user with enough reputation to vote, flag and comment.
    pub voter: UserId,
}

/// Creates a forum with one question carrying `prior_votes` up votes from
/// distinct users
pub fn setup_forum(prior_votes: usize) -> BenchForum {
    let ledger = Ledger::open(Arc::new(InMemory::new()), Settings::default())
        .expect("Failed to open ledger");
    let author = ledger.register_user("author").expect("Failed to add user");
    let voter = ledger.register_user("voter").expect("Failed to add user");
    let voter = ledger
        .set_superuser(&voter.id, true)
        .expect("Failed to grant superuser");

    let content = RevisionContent::new("How fast is this?")
        .with_title("Benchmarks")
        .with_tags("perf");
    let (_, question) = ledger.ask(&author.id, content).expect("Failed to ask");

    for i in 0..prior_votes {
        let fan = ledger
            .register_user(&format!("fan{i}"))
            .expect("Failed to add user");
        ledger
            .create::<VoteUpAction>(&fan.id, Some(&question.id), "")
            .expect("Failed to vote");
    }

    BenchForum {
        ledger,
        question: question.id,
        voter: voter.id,
    }
}
