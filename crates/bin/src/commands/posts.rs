//! Content commands: asking, answering, commenting and editing.

use quorum::{
    commands,
    model::{Node, NodeType, RevisionContent},
};

use super::{CmdResult, print_action};
use crate::{
    cli::{AnswerArgs, AskArgs, CommentArgs, EditArgs, RetagArgs, RollbackArgs},
    output::{OutputFormat, print_json},
    session::{Session, node_id},
};

fn print_created(node: &Node, format: OutputFormat) -> CmdResult {
    match format {
        OutputFormat::Human => println!("Created {} {}", node.node_type, node.id),
        OutputFormat::Json => print_json(node)?,
    }
    Ok(())
}

/// Run the `ask` command
pub fn ask(session: &Session, args: &AskArgs, format: OutputFormat) -> CmdResult {
    let actor = session.actor(args.actor.username.as_deref())?;
    let content = RevisionContent::new(args.body.as_str())
        .with_title(args.title.as_str())
        .with_tags(&args.tags);
    let (_, node) = commands::ask_question(&session.ledger, actor.as_ref(), content)?;
    session.save()?;
    print_created(&node, format)
}

/// Run the `answer` command
pub fn answer(session: &Session, args: &AnswerArgs, format: OutputFormat) -> CmdResult {
    let actor = session.actor(args.actor.username.as_deref())?;
    let question = node_id(&args.question);
    let content = RevisionContent::new(args.body.as_str());
    let (_, node) = commands::answer_question(&session.ledger, actor.as_ref(), &question, content)?;
    session.save()?;
    print_created(&node, format)
}

/// Run the `comment` command
pub fn comment(session: &Session, args: &CommentArgs, format: OutputFormat) -> CmdResult {
    let actor = session.actor(args.actor.username.as_deref())?;
    let parent = node_id(&args.parent);
    let (_, node) = commands::comment(&session.ledger, actor.as_ref(), &parent, &args.text)?;
    session.save()?;
    print_created(&node, format)
}

/// Run the `edit` command
///
/// Comments are edited in place of their text; questions keep their title
/// and tags unless new ones are given.
pub fn edit(session: &Session, args: &EditArgs, format: OutputFormat) -> CmdResult {
    let actor = session.actor(args.actor.username.as_deref())?;
    let id = node_id(&args.node);
    let node = session.ledger.node(&id)?;

    let action = if node.node_type == NodeType::Comment {
        commands::edit_comment(&session.ledger, actor.as_ref(), &id, &args.body)?
    } else {
        let title = args.title.clone().unwrap_or_else(|| node.title.clone());
        let tags = args.tags.clone().unwrap_or_else(|| node.tagnames());
        let mut content = RevisionContent::new(args.body.as_str())
            .with_title(title)
            .with_tags(&tags);
        if let Some(summary) = &args.summary {
            content = content.with_summary(summary.as_str());
        }
        commands::edit_post(&session.ledger, actor.as_ref(), &id, content)?
    };
    session.save()?;
    print_action(session, &action, format)
}

/// Run the `retag` command
pub fn retag(session: &Session, args: &RetagArgs, format: OutputFormat) -> CmdResult {
    let actor = session.actor(args.actor.username.as_deref())?;
    let question = node_id(&args.question);
    let action = commands::retag_question(&session.ledger, actor.as_ref(), &question, &args.tags)?;
    session.save()?;
    print_action(session, &action, format)
}

/// Run the `rollback` command
pub fn rollback(session: &Session, args: &RollbackArgs, format: OutputFormat) -> CmdResult {
    let actor = session.actor(args.actor.username.as_deref())?;
    let node = node_id(&args.node);
    let action = commands::rollback_post(&session.ledger, actor.as_ref(), &node, args.revision)?;
    session.save()?;
    print_action(session, &action, format)
}
