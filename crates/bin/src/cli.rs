//! CLI argument definitions for the Quorum binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;

/// Quorum forum ledger
#[derive(Parser, Debug)]
#[command(name = "quorum")]
#[command(about = "Quorum: Q&A forum actions, moderation and reputation")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where state and configuration are read from
#[derive(clap::Args, Debug, Clone)]
pub struct StoreArgs {
    /// JSON file holding the forum state. Created on first write.
    #[arg(
        short = 'D',
        long,
        default_value = "quorum.json",
        env = "QUORUM_DATA_FILE",
        global = true
    )]
    pub data_file: PathBuf,

    /// JSON settings file overriding the default thresholds
    #[arg(long, env = "QUORUM_SETTINGS", global = true)]
    pub settings: Option<PathBuf>,
}

/// Acting user. Omit to act anonymously.
#[derive(clap::Args, Debug, Clone)]
pub struct ActorArgs {
    /// Username to act as
    #[arg(short = 'u', long = "as", env = "QUORUM_USER")]
    pub username: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    #[command(subcommand)]
    User(UserCommands),
    /// Ask a question
    Ask(AskArgs),
    /// Answer a question
    Answer(AnswerArgs),
    /// Comment on a question or answer
    Comment(CommentArgs),
    /// Edit a post through a new revision
    Edit(EditArgs),
    /// Replace a question's tags
    Retag(RetagArgs),
    /// Revert a post to an earlier revision
    Rollback(RollbackArgs),
    /// Vote a post up or down, or withdraw a vote
    Vote(VoteArgs),
    /// Like a comment, or take the like back
    Like(NodeArgs),
    /// Flag a post
    Flag(ReasonArgs),
    /// Mark or unmark a question as favorite
    Favorite(NodeArgs),
    /// Accept an answer, or un-accept it
    Accept(NodeArgs),
    /// Delete a post, or restore a deleted one
    Delete(ReasonArgs),
    /// Show a post or a user
    #[command(subcommand)]
    Show(ShowCommands),
    /// List actions, newest last
    History(HistoryArgs),
    /// Check reputation counters against their rows
    Audit,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Register a user
    Add {
        username: String,
        /// Grant superuser rights
        #[arg(long)]
        superuser: bool,
    },
    /// List users
    List,
}

#[derive(clap::Args, Debug)]
pub struct AskArgs {
    #[command(flatten)]
    pub actor: ActorArgs,
    #[arg(short, long)]
    pub title: String,
    /// Space separated tag names
    #[arg(long, default_value = "")]
    pub tags: String,
    pub body: String,
}

#[derive(clap::Args, Debug)]
pub struct AnswerArgs {
    #[command(flatten)]
    pub actor: ActorArgs,
    pub question: String,
    pub body: String,
}

#[derive(clap::Args, Debug)]
pub struct CommentArgs {
    #[command(flatten)]
    pub actor: ActorArgs,
    pub parent: String,
    pub text: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    #[command(flatten)]
    pub actor: ActorArgs,
    pub node: String,
    pub body: String,
    /// New title; questions keep their current title when omitted
    #[arg(short, long)]
    pub title: Option<String>,
    /// New tags; questions keep their current tags when omitted
    #[arg(long)]
    pub tags: Option<String>,
    /// Edit summary
    #[arg(short, long)]
    pub summary: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RetagArgs {
    #[command(flatten)]
    pub actor: ActorArgs,
    pub question: String,
    pub tags: String,
}

#[derive(clap::Args, Debug)]
pub struct RollbackArgs {
    #[command(flatten)]
    pub actor: ActorArgs,
    pub node: String,
    /// Revision number to restore
    pub revision: u32,
}

/// Vote direction
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Direction {
    Up,
    Down,
}

#[derive(clap::Args, Debug)]
pub struct VoteArgs {
    #[command(flatten)]
    pub actor: ActorArgs,
    pub node: String,
    #[arg(value_enum)]
    pub direction: Direction,
}

#[derive(clap::Args, Debug)]
pub struct NodeArgs {
    #[command(flatten)]
    pub actor: ActorArgs,
    pub node: String,
}

#[derive(clap::Args, Debug)]
pub struct ReasonArgs {
    #[command(flatten)]
    pub actor: ActorArgs,
    pub node: String,
    #[arg(default_value = "")]
    pub reason: String,
}

#[derive(Subcommand, Debug)]
pub enum ShowCommands {
    /// Show a post with its children and revisions
    Node { node: String },
    /// Show a user and their reputation history
    User { username: String },
}

#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    /// Only actions by this username
    #[arg(long)]
    pub user: Option<String>,
    /// Only actions on this node
    #[arg(long)]
    pub node: Option<String>,
    /// Include canceled actions
    #[arg(long)]
    pub all: bool,
}
