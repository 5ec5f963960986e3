mod api;
mod cli;
mod config;
mod db;
mod entry;
mod errors;
mod export;
mod generate;
mod server;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chronicle", version, about = "Turn your daily diary into AI-narrated episodes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the web server (REST API + browser UI)
    Serve {
        /// Directory containing the static web UI
        #[arg(long, default_value = "static")]
        static_dir: PathBuf,
    },
    /// Add a diary entry from the command line
    Add {
        /// The diary entry text
        text: String,
        /// Date in YYYY-MM-DD format (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Skip AI narrative/title generation
        #[arg(long)]
        skip_ai: bool,
    },
    /// List recent entries
    List {
        /// Maximum entries to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Export entries to Markdown
    Export {
        /// Export a specific entry by id
        #[arg(long, conflicts_with = "weekly")]
        id: Option<i64>,
        /// Export the last 7 days as one file
        #[arg(long)]
        weekly: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::ChronicleConfig::load()?;

    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { static_dir } => {
            server::serve(config, static_dir).await?;
        }
        // CLI commands use the blocking generator client, which must not run
        // on an async worker thread.
        Command::Add {
            text,
            date,
            skip_ai,
        } => {
            tokio::task::spawn_blocking(move || cli::add(&config, &text, date, skip_ai)).await??;
        }
        Command::List { limit, json } => {
            tokio::task::spawn_blocking(move || cli::list(&config, limit, json)).await??;
        }
        Command::Export { id, weekly } => {
            tokio::task::spawn_blocking(move || cli::export(&config, id, weekly)).await??;
        }
    }

    Ok(())
}
