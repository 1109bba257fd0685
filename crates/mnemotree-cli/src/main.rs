//! mnemotree CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod clock;
mod commands;
mod config;

#[derive(Parser)]
#[command(
    name = "mnemotree",
    version,
    about = "Spaced-repetition planner for a tree of topics"
)]
struct Cli {
    /// Snapshot file (overrides config and MNEMOTREE_SNAPSHOT)
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretend the current time is this RFC 3339 timestamp
    #[arg(long, global = true)]
    now: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and an empty knowledge tree
    Init,

    /// Add a topic to the tree
    Add {
        /// Topic title
        #[arg(long)]
        title: String,

        /// Parent item ID (defaults to the root)
        #[arg(long)]
        parent: Option<String>,

        /// Add the topic without scheduling it
        #[arg(long)]
        suspended: bool,
    },

    /// Remove a topic and everything below it
    Remove {
        /// Item ID or unique prefix
        id: String,
    },

    /// Show the tree with status and due dates
    List,

    /// Show one item's state and review history
    Show {
        /// Item ID or unique prefix
        id: String,
    },

    /// Record a review
    Review {
        /// Item ID or unique prefix
        id: String,

        /// 1-4 or again, hard, good, easy
        rating: String,

        /// When the review happened (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// Delete a review log entry
    Unlog {
        /// Item ID or unique prefix
        id: String,

        /// Log entry ID
        entry_id: String,
    },

    /// Exclude an item from review
    Suspend {
        /// Item ID or unique prefix
        id: String,
    },

    /// Put a suspended item back on the schedule
    Unsuspend {
        /// Item ID or unique prefix
        id: String,
    },

    /// List items due for review now
    Due,

    /// Show confirmed and projected reviews per day
    Calendar {
        /// Days to project (defaults to the configured horizon)
        #[arg(long)]
        days: Option<u32>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Summary statistics
    Stats,

    /// Check the tree and its scheduling states
    Validate {
        /// Replay every item to repair drifted states
        #[arg(long)]
        fix: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mnemotree=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = commands::Session::open(cli.config, cli.snapshot, cli.now.as_deref()).and_then(
        |session| match cli.command {
            Commands::Init => commands::init::execute(&session),
            Commands::Add {
                title,
                parent,
                suspended,
            } => commands::add::execute(&session, title, parent, suspended),
            Commands::Remove { id } => commands::remove::execute(&session, id),
            Commands::List => commands::list::execute(&session),
            Commands::Show { id } => commands::show::execute(&session, id),
            Commands::Review { id, rating, at } => {
                commands::review::execute(&session, id, rating, at)
            }
            Commands::Unlog { id, entry_id } => commands::unlog::execute(&session, id, entry_id),
            Commands::Suspend { id } => commands::suspend::execute(&session, id, true),
            Commands::Unsuspend { id } => commands::suspend::execute(&session, id, false),
            Commands::Due => commands::due::execute(&session),
            Commands::Calendar { days, format } => {
                commands::calendar::execute(&session, days, format)
            }
            Commands::Stats => commands::stats::execute(&session),
            Commands::Validate { fix } => commands::validate::execute(&session, fix),
        },
    );

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
