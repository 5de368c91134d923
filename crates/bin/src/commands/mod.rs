//! Subcommand implementations.

use quorum::model::Action;

use crate::{
    output::{OutputFormat, print_json},
    session::Session,
};

pub mod inspect;
pub mod moderation;
pub mod posts;
pub mod users;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Print an action as an activity line, or as JSON.
pub(crate) fn print_action(session: &Session, action: &Action, format: OutputFormat) -> CmdResult {
    match format {
        OutputFormat::Human => {
            let description = session.ledger.describe(&action.id)?;
            println!("{description}");
            println!("  action {} ({})", action.id, action.action_type);
        }
        OutputFormat::Json => print_json(action)?,
    }
    Ok(())
}
