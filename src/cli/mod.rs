//! Command-line interface for the restaurant finder.

mod commands;

use clap::{Parser, Subcommand};

/// Restaurant Finder - restaurants near a UK postcode
#[derive(Parser)]
#[command(name = "restaurant-finder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[command(alias = "server", alias = "web")]
    Serve,

    /// Run a single search and print the results
    #[command(alias = "q")]
    Query {
        /// UK postcode, e.g. "EC4M 7RF"
        postcode: String,

        /// Maximum distance in miles
        #[arg(long)]
        distance: Option<u32>,

        /// Pipe-separated cuisines, e.g. "italian|pizza"
        #[arg(long)]
        cuisines: Option<String>,

        /// Minimum star rating (0-5)
        #[arg(long)]
        min_rating: Option<u32>,

        /// Print the matching records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
