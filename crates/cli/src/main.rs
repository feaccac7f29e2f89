mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "bref", version, about = "Incoming reference counts for markdown vaults")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print resolved settings
    Doctor,

    /// Scan the vault and rebuild the reference index from scratch
    Reindex(ReindexArgs),

    /// List reference targets with their incoming reference counts
    Groups(GroupsArgs),

    /// List the references pointing at one target key
    Refs(RefsArgs),

    /// Show a note's blocks, headings, links and embeds with reference counts
    View(ViewArgs),

    /// Poll the vault and rebuild incrementally on changes
    Watch(WatchArgs),
}

/// Output format for query commands.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Quiet,
}

#[derive(Debug, Args)]
pub struct ReindexArgs {
    /// Print detailed statistics
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Shorthand for --output json
    #[arg(long)]
    pub json: bool,

    /// Print keys only
    #[arg(long, short)]
    pub quiet: bool,

    /// Show at most N targets
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Count references to notes that opted out of the index
    #[arg(long)]
    pub include_excluded: bool,
}

#[derive(Debug, Args)]
pub struct RefsArgs {
    /// Target key, e.g. "Projects/Alpha", "Projects/Alpha#Goals" or "Alpha#^ship"
    pub key: String,

    #[arg(long, short, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    #[arg(long)]
    pub json: bool,

    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Note path relative to the vault root
    pub path: String,

    #[arg(long, short, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Polling interval in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub interval_ms: u64,

    /// Stop after N polls (runs until interrupted when omitted)
    #[arg(long)]
    pub iterations: Option<u64>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Doctor => cmd::doctor::run(config, profile),
        Commands::Reindex(args) => cmd::reindex::run(config, profile, args.verbose),
        Commands::Groups(args) => cmd::groups::run(config, profile, args),
        Commands::Refs(args) => cmd::refs::run(config, profile, args),
        Commands::View(args) => cmd::view::run(config, profile, args),
        Commands::Watch(args) => cmd::watch::run(config, profile, args)?,
    }
    logging::flush();
    Ok(())
}
