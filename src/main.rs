//! # askbar CLI
//!
//! The `askbar` binary fronts the whole tool: one-shot questions with a
//! typed answer, an interactive prompt, the HTTP relay server, and the
//! recent-queries log.
//!
//! ## Usage
//!
//! ```bash
//! askbar --config ./askbar.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `askbar ask "<query>"` | Relay a query and type out the answer |
//! | `askbar ask` | Interactive prompt with a typed placeholder hint |
//! | `askbar serve` | Start the HTTP relay server (`POST /api/search`) |
//! | `askbar history list` | Show the recent-queries log |
//! | `askbar history clear` | Delete the recent-queries log |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use askbar::{ask, config, history, server};

/// askbar — relay search queries to a hosted completion API and reveal
/// the answer with a typed animation.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; every setting has a default, so the file is optional.
#[derive(Parser)]
#[command(
    name = "askbar",
    about = "An AI answer bar — ask questions, get typed answers",
    version,
    long_about = "askbar forwards a text query to a hosted completion API and reveals the \
    answer character by character, the way a search bar types. It also serves the relay \
    over HTTP for browser clients and keeps a small log of recent queries."
)]
struct Cli {
    /// Path to configuration file (TOML). Optional — defaults apply.
    #[arg(long, global = true, default_value = "./askbar.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Ask a question and reveal the answer.
    ///
    /// With no query argument, reads one line from stdin, showing a
    /// rotating typed placeholder hint on a TTY. An empty query is a
    /// silent no-op. Requires `OPENAI_API_KEY` unless the provider is
    /// disabled.
    Ask {
        /// The question to ask. Omit to read from stdin.
        query: Option<String>,

        /// Print the answer in one piece, skipping the typed reveal.
        /// Implied when stdout is not a TTY.
        #[arg(long)]
        plain: bool,
    },

    /// Start the HTTP relay server.
    ///
    /// Binds to `[server].bind` and exposes `POST /api/search` plus a
    /// `GET /health` check, with permissive CORS for browser clients.
    Serve,

    /// Manage the recent-queries log.
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
}

/// History subcommands.
#[derive(Subcommand)]
enum HistoryAction {
    /// Show recent queries, most recent first (default).
    List,
    /// Delete the log file.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Ask { query, plain } => {
            ask::run_ask(&cfg, query, plain).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::History { action } => match action.unwrap_or(HistoryAction::List) {
            HistoryAction::List => history::run_list(&cfg)?,
            HistoryAction::Clear => history::run_clear(&cfg)?,
        },
    }

    Ok(())
}
