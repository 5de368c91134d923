//! User management commands.

use super::CmdResult;
use crate::{
    output::{OutputFormat, print_json, print_table},
    session::Session,
};

/// Run the `user add` command
pub fn add(session: &Session, username: &str, superuser: bool, format: OutputFormat) -> CmdResult {
    if session.ledger.find_user(username)?.is_some() {
        return Err(format!("User {username} already exists").into());
    }
    let mut user = session.ledger.register_user(username)?;
    if superuser {
        user = session.ledger.set_superuser(&user.id, true)?;
    }
    session.save()?;

    match format {
        OutputFormat::Human => println!("Registered {} ({})", user.username, user.id),
        OutputFormat::Json => print_json(&user)?,
    }
    Ok(())
}

/// Run the `show user` command
pub fn show(session: &Session, username: &str, format: OutputFormat) -> CmdResult {
    let id = session.user_id(username)?;
    let user = session.ledger.user(&id)?;
    let reputes = session.ledger.reputes_for_user(&id)?;

    match format {
        OutputFormat::Human => {
            println!("User:        {}", user.username);
            println!("ID:          {}", user.id);
            println!("Reputation:  {}", user.reputation);
            println!("Superuser:   {}", user.is_superuser);
            println!("Joined:      {}", user.date_joined.to_rfc3339());
            if reputes.is_empty() {
                return Ok(());
            }
            println!();
            let mut rows = Vec::with_capacity(reputes.len());
            for repute in &reputes {
                let action = session.ledger.action(&repute.action)?;
                rows.push(vec![
                    repute.reputed_at(&action).format("%Y-%m-%d %H:%M").to_string(),
                    format!("{:+}", repute.value),
                    action.action_type,
                    if repute.by_canceled { "reversal" } else { "" }.to_string(),
                ]);
            }
            print_table(&["WHEN", "CHANGE", "ACTION", "NOTE"], &rows);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "user": user,
                "reputes": reputes,
            });
            print_json(&value)?;
        }
    }
    Ok(())
}

/// Run the `user list` command
pub fn list(session: &Session, format: OutputFormat) -> CmdResult {
    let mut users = session.ledger.users()?;
    users.sort_by(|a, b| b.reputation.cmp(&a.reputation).then(a.username.cmp(&b.username)));

    match format {
        OutputFormat::Human => {
            if users.is_empty() {
                println!("No users found.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = users
                .iter()
                .map(|u| {
                    vec![
                        u.username.clone(),
                        u.reputation.to_string(),
                        if u.is_superuser { "yes" } else { "" }.to_string(),
                        u.id.to_string(),
                    ]
                })
                .collect();
            print_table(&["USER", "REPUTATION", "SUPERUSER", "ID"], &rows);
        }
        OutputFormat::Json => print_json(&users)?,
    }
    Ok(())
}
