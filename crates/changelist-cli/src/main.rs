mod cmd_replay;
mod cmd_status;
mod cmd_tree;
mod view;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "changelist")]
#[command(about = "Show the reconciled change-list tree of a repository or change list")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the working-tree changes of a git repository
    Status {
        /// Path to the git repository
        #[arg(short, long, default_value = ".")]
        repo: PathBuf,

        /// Directory extension treated as a composite document (repeatable)
        #[arg(long = "ext", value_name = "EXT", default_value = "sketch")]
        extensions: Vec<String>,

        /// Leave untracked files out
        #[arg(long)]
        no_untracked: bool,

        #[command(flatten)]
        view: view::ViewArgs,
    },
    /// Show the tree for a JSON array of change records
    Tree {
        /// Input file (use - for stdin)
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        view: view::ViewArgs,
    },
    /// Feed a sequence of rebuild and toggle events through one view
    Replay {
        /// Input file (use - for stdin)
        #[arg(short, long)]
        input: String,

        /// When a rebuild re-derives the tree
        #[arg(long, value_enum, default_value_t = cmd_replay::Policy::Always)]
        policy: cmd_replay::Policy,

        /// Output as JSON (one object per event)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Status {
            repo,
            extensions,
            no_untracked,
            view,
        } => cmd_status::run(repo, extensions, !no_untracked, view, cli.pretty),
        Commands::Tree { input, view } => cmd_tree::run(&input, view, cli.pretty),
        Commands::Replay {
            input,
            policy,
            json,
        } => cmd_replay::run(&input, policy, json, cli.pretty),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
