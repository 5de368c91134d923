use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod commands;
mod output;
mod session;

use cli::{Cli, Commands, ShowCommands, UserCommands};
use session::Session;

fn main() {
    // Logs go to stderr so JSON output stays machine readable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quorum=info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(&cli.store)?;
    let format = cli.format;

    match &cli.command {
        Commands::User(UserCommands::Add {
            username,
            superuser,
        }) => commands::users::add(&session, username, *superuser, format),
        Commands::User(UserCommands::List) => commands::users::list(&session, format),
        Commands::Ask(args) => commands::posts::ask(&session, args, format),
        Commands::Answer(args) => commands::posts::answer(&session, args, format),
        Commands::Comment(args) => commands::posts::comment(&session, args, format),
        Commands::Edit(args) => commands::posts::edit(&session, args, format),
        Commands::Retag(args) => commands::posts::retag(&session, args, format),
        Commands::Rollback(args) => commands::posts::rollback(&session, args, format),
        Commands::Vote(args) => commands::moderation::vote(&session, args, format),
        Commands::Like(args) => commands::moderation::like(&session, args, format),
        Commands::Flag(args) => commands::moderation::flag(&session, args, format),
        Commands::Favorite(args) => commands::moderation::favorite(&session, args, format),
        Commands::Accept(args) => commands::moderation::accept(&session, args, format),
        Commands::Delete(args) => commands::moderation::delete(&session, args, format),
        Commands::Show(ShowCommands::Node { node }) => {
            commands::inspect::show(&session, node, format)
        }
        Commands::Show(ShowCommands::User { username }) => {
            commands::users::show(&session, username, format)
        }
        Commands::History(args) => commands::inspect::history(&session, args, format),
        Commands::Audit => commands::inspect::audit(&session, format),
    }
}
