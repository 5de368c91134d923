//! Read-only commands.

use quorum::store::ActionFilter;

use super::CmdResult;
use crate::{
    cli::HistoryArgs,
    output::{OutputFormat, print_json, print_table, truncate},
    session::{Session, node_id},
};

/// Run the `show node` command
pub fn show(session: &Session, node: &str, format: OutputFormat) -> CmdResult {
    let id = node_id(node);
    let node = session.ledger.node(&id)?;
    let children = session.ledger.children(&id)?;
    let revisions = session.ledger.revisions(&id)?;

    match format {
        OutputFormat::Human => {
            let author = session.ledger.user(&node.author)?;
            if !node.title.is_empty() {
                println!("{}", node.title);
            }
            println!("{} {} by {}", node.node_type, node.id, author.username);
            println!(
                "score {}  flags {}  comments {}  favorites {}  revisions {}",
                node.score,
                node.flag_count,
                node.comment_count,
                node.favorite_count,
                revisions.len()
            );
            if !node.tag_names.is_empty() {
                println!("tags: {}", node.tagnames());
            }
            if node.accepted() {
                println!("accepted answer");
            }
            if node.is_deleted() {
                println!("deleted");
            }
            println!();
            println!("{}", node.body);

            if !children.is_empty() {
                println!();
                let rows: Vec<Vec<String>> = children
                    .iter()
                    .map(|c| {
                        vec![
                            c.id.to_string(),
                            c.node_type.to_string(),
                            c.score.to_string(),
                            if c.accepted() { "*" } else { "" }.to_string(),
                            truncate(&c.body, 48),
                        ]
                    })
                    .collect();
                print_table(&["ID", "TYPE", "SCORE", "ACC", "BODY"], &rows);
            }
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "node": node,
                "children": children,
                "revisions": revisions,
            });
            print_json(&value)?;
        }
    }
    Ok(())
}

/// Run the `history` command
pub fn history(session: &Session, args: &HistoryArgs, format: OutputFormat) -> CmdResult {
    let mut filter = ActionFilter::new();
    if let Some(username) = &args.user {
        filter = filter.user(&session.user_id(username)?);
    }
    if let Some(node) = &args.node {
        filter = filter.node(&node_id(node));
    }
    if !args.all {
        filter = filter.live();
    }
    let actions = session.ledger.actions(&filter)?;

    match format {
        OutputFormat::Human => {
            if actions.is_empty() {
                println!("No actions found.");
                return Ok(());
            }
            let mut rows = Vec::with_capacity(actions.len());
            for action in &actions {
                let description = session.ledger.describe(&action.id)?;
                rows.push(vec![
                    action.action_date.format("%Y-%m-%d %H:%M").to_string(),
                    action.id.to_string(),
                    if action.canceled { "canceled" } else { "" }.to_string(),
                    truncate(&description.to_string(), 72),
                ]);
            }
            print_table(&["WHEN", "ACTION", "STATE", "ACTIVITY"], &rows);
        }
        OutputFormat::Json => print_json(&actions)?,
    }
    Ok(())
}

/// Run the `audit` command
///
/// Exits with an error when any counter is out of sync.
pub fn audit(session: &Session, format: OutputFormat) -> CmdResult {
    let mismatches = session.ledger.audit_reputation()?;

    match format {
        OutputFormat::Human => {
            if mismatches.is_empty() {
                println!("All reputation counters match their rows.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = mismatches
                .iter()
                .map(|m| {
                    vec![
                        m.username.clone(),
                        m.recorded.to_string(),
                        m.computed.to_string(),
                    ]
                })
                .collect();
            print_table(&["USER", "RECORDED", "COMPUTED"], &rows);
        }
        OutputFormat::Json => print_json(&mismatches)?,
    }

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(format!("{} reputation counters out of sync", mismatches.len()).into())
    }
}
