//! # Sitebot CLI (`sitebot`)
//!
//! ## Usage
//!
//! ```bash
//! sitebot --config ./config/sitebot.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sitebot serve` | Build the index and start the HTTP API |
//! | `sitebot ask "<question>"` | Answer one question |
//! | `sitebot search "<query>"` | Preview retrieval without calling the model |
//! | `sitebot index` | List indexed records |
//! | `sitebot status` | Show API key and index status |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sitebot::{ask, config, index_cmd, logging, search, server, status};

/// Sitebot: answer questions about a website from its own content.
#[derive(Parser)]
#[command(
    name = "sitebot",
    about = "Sitebot: a content-aware chatbot for your website",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/sitebot.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and start the HTTP server.
    ///
    /// Binds to `[server].bind` and serves `POST /v1/query` and `GET /health`.
    Serve,

    /// Answer a single question and print it with its sources.
    Ask {
        /// The question.
        query: String,
    },

    /// Show which records a query retrieves and the context it produces.
    ///
    /// Does not call the language model.
    Search {
        /// The search query string.
        query: String,

        /// Print the extracted terms and each matching record's score.
        #[arg(long)]
        explain: bool,
    },

    /// List every record in the index.
    Index,

    /// Report API key and index status.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => server::run_server(&cfg).await?,
        Commands::Ask { query } => ask::run_ask(&cfg, &query).await?,
        Commands::Search { query, explain } => search::run_search(&cfg, &query, explain).await?,
        Commands::Index => index_cmd::run_index(&cfg).await?,
        Commands::Status => status::run_status(&cfg).await?,
    }

    Ok(())
}
