//! Voting, flagging, favorites, acceptance and deletion.

use quorum::commands::{self, DeleteOutcome, VoteDirection};

use super::{CmdResult, print_action};
use crate::{
    cli::{Direction, NodeArgs, ReasonArgs, VoteArgs},
    output::{OutputFormat, print_json},
    session::{Session, node_id},
};

/// Run the `vote` command
pub fn vote(session: &Session, args: &VoteArgs, format: OutputFormat) -> CmdResult {
    let actor = session.actor(args.actor.username.as_deref())?;
    let node = node_id(&args.node);
    let direction = match args.direction {
        Direction::Up => VoteDirection::Up,
        Direction::Down => VoteDirection::Down,
    };
    let outcome = commands::vote_post(&session.ledger, actor.as_ref(), &node, direction)?;
    session.save()?;

    match format {
        OutputFormat::Human => {
            let score = session.ledger.node(&node)?.score;
            match outcome.state {
                Some(direction) => println!("Voted {direction}, score is now {score}"),
                None => println!("Vote withdrawn, score is now {score}"),
            }
            println!("{} votes left today", outcome.votes_left);
        }
        OutputFormat::Json => print_json(&outcome)?,
    }
    Ok(())
}

/// Run the `like` command
pub fn like(session: &Session, args: &NodeArgs, format: OutputFormat) -> CmdResult {
    let actor = session.actor(args.actor.username.as_deref())?;
    let comment = node_id(&args.node);
    let outcome = commands::like_comment(&session.ledger, actor.as_ref(), &comment)?;
    session.save()?;

    match format {
        OutputFormat::Human if outcome.active => println!("Liked comment {comment}"),
        OutputFormat::Human => println!("Like on comment {comment} taken back"),
        OutputFormat::Json => print_json(&outcome)?,
    }
    Ok(())
}

/// Run the `flag` command
pub fn flag(session: &Session, args: &ReasonArgs, format: OutputFormat) -> CmdResult {
    let actor = session.actor(args.actor.username.as_deref())?;
    let node = node_id(&args.node);
    let action = commands::flag_post(&session.ledger, actor.as_ref(), &node, &args.reason)?;
    session.save()?;
    print_action(session, &action, format)?;

    if format == OutputFormat::Human {
        let node = session.ledger.node(&node)?;
        println!("  post has {} flags", node.flag_count);
        if node.is_deleted() {
            println!("  post is deleted");
        }
    }
    Ok(())
}

/// Run the `favorite` command
pub fn favorite(session: &Session, args: &NodeArgs, format: OutputFormat) -> CmdResult {
    let actor = session.actor(args.actor.username.as_deref())?;
    let question = node_id(&args.node);
    let outcome = commands::mark_favorite(&session.ledger, actor.as_ref(), &question)?;
    session.save()?;

    match format {
        OutputFormat::Human => {
            let count = session.ledger.node(&question)?.favorite_count;
            let state = if outcome.active { "Marked" } else { "Unmarked" };
            println!("{state} {question} as favorite, {count} users have it marked");
        }
        OutputFormat::Json => print_json(&outcome)?,
    }
    Ok(())
}

/// Run the `accept` command
pub fn accept(session: &Session, args: &NodeArgs, format: OutputFormat) -> CmdResult {
    let actor = session.actor(args.actor.username.as_deref())?;
    let answer = node_id(&args.node);
    let outcome = commands::accept_answer(&session.ledger, actor.as_ref(), &answer)?;
    session.save()?;

    match format {
        OutputFormat::Human => {
            for canceled in &outcome.canceled {
                let node = canceled.node.as_ref().map(|n| n.to_string()).unwrap_or_default();
                println!("Un-accepted answer {node}");
            }
            if let Some(accepted) = &outcome.accepted {
                print_action(session, accepted, format)?;
            }
        }
        OutputFormat::Json => print_json(&outcome)?,
    }
    Ok(())
}

/// Run the `delete` command
///
/// Deleting an already deleted post restores it.
pub fn delete(session: &Session, args: &ReasonArgs, format: OutputFormat) -> CmdResult {
    let actor = session.actor(args.actor.username.as_deref())?;
    let node = node_id(&args.node);
    let post = session.ledger.node(&node)?;

    if post.node_type == quorum::model::NodeType::Comment {
        let action = commands::delete_comment(&session.ledger, actor.as_ref(), &node, &args.reason)?;
        session.save()?;
        return match action {
            Some(action) => print_action(session, &action, format),
            None if format == OutputFormat::Human => {
                println!("Comment {node} is already deleted");
                Ok(())
            }
            None => print_json(&serde_json::Value::Null),
        };
    }

    let outcome = commands::delete_post(&session.ledger, actor.as_ref(), &node, &args.reason)?;
    session.save()?;
    match format {
        OutputFormat::Human => {
            if let DeleteOutcome::Restored(_) = outcome {
                println!("Restored {node}");
            }
            print_action(session, outcome.action(), format)?;
        }
        OutputFormat::Json => print_json(&outcome)?,
    }
    Ok(())
}
