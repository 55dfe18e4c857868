pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "flashnews")]
#[command(about = "Offline-first top headlines in the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show top headlines, refreshing the cache when it is stale
    Headlines {
        /// Refresh from the network even if the cache is fresh
        #[arg(short, long)]
        refresh: bool,

        /// Two-letter country code (default: from config)
        #[arg(short, long)]
        country: Option<String>,
    },
    /// Follow headlines and refresh them periodically
    Watch {
        /// Two-letter country code (default: from config)
        #[arg(short, long)]
        country: Option<String>,

        /// Refresh interval (e.g., "30m", "1h")
        #[arg(short, long, default_value = "30m")]
        every: String,
    },
    /// Show a cached article
    Show {
        /// URL of the article
        url: String,

        /// Open the article in the browser
        #[arg(short, long)]
        open: bool,
    },
    /// Search all articles (not cached)
    Search {
        /// Keywords or phrase
        query: String,
    },
    /// Remove cached articles older than the given age
    Prune {
        /// Age (e.g., "12h", "1d")
        #[arg(long, default_value = "1d")]
        older_than: String,
    },
    /// Remove every cached article
    Clear,
}
