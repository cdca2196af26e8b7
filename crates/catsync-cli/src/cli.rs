use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "catsync",
    about = "catsync: keep catalog entries in step across a merchant's partitions",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// JSON fixture with the partitions and records to load
    #[arg(long, global = true, default_value = "catsync.json")]
    pub fixture: PathBuf,

    /// TOML configuration (confirmation timeout, owner preferences)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print the store contents as JSON when done
    #[arg(long, global = true)]
    pub dump: bool,

    /// Save the store contents back to the fixture file when done
    #[arg(long, global = true)]
    pub write: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the partitions of an owner
    Partitions(PartitionsArgs),
    /// Re-synchronize a stored entry to its sibling partitions now
    Sync(SyncArgs),
    /// Run the on-save propagation for an entry, honoring owner preferences
    OnSave(OnSaveArgs),
}

#[derive(Args)]
pub struct PartitionsArgs {
    #[arg(long)]
    pub owner: String,
}

#[derive(Args)]
pub struct TargetArgs {
    /// Partition holding the source entry
    #[arg(long)]
    pub partition: String,
    /// Record id of the source entry
    #[arg(long)]
    pub entry: String,
    #[arg(long)]
    pub owner: String,
    /// Acting user, recorded as creator of new copies
    #[arg(long, default_value = "cli")]
    pub user: String,
}

#[derive(Args, Clone, Copy)]
pub struct AnswerArgs {
    /// Accept every match that needs confirmation
    #[arg(long, conflicts_with = "decline_all")]
    pub accept_all: bool,
    /// Decline every match that needs confirmation
    #[arg(long)]
    pub decline_all: bool,
}

#[derive(Args)]
pub struct SyncArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    #[command(flatten)]
    pub answers: AnswerArgs,
}

#[derive(Args)]
pub struct OnSaveArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    #[command(flatten)]
    pub answers: AnswerArgs,
    /// Legacy code of the entry before the edit
    #[arg(long)]
    pub original_code: Option<String>,
}
