use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Browse book-source listings fetched through public relays
#[derive(Parser)]
#[command(name = "bookscout")]
#[command(version, about = "Fetch, filter and summarize book-source listings", long_about = None)]
pub struct Cli {
    /// Config file (defaults to bookscout.toml in the user config dir)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one listing page through the relays
    Page {
        /// Page number, starting at 1
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
        /// Only show sources whose title or id contains this text
        #[arg(short, long)]
        filter: Option<String>,
        /// Print the raw result envelope as JSON
        #[arg(long)]
        json: bool,
        /// Summarize the titles with the configured model
        #[arg(long)]
        analyze: bool,
        /// Show the table in chunks of this many rows
        #[arg(long, value_name = "N", conflicts_with = "json")]
        per_page: Option<usize>,
        /// Which chunk to show (default 1)
        #[arg(long, value_name = "K", requires = "per_page")]
        view: Option<usize>,
    },
    /// Run the extractor over a saved HTML file
    Parse {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// List configured relays
    Relays,
}
