//! CLI definitions for the talpa command-line interface.
//!
//! Two subcommands: `search` runs a query against a published site the way
//! the in-page search box would, and `inspect` sanity-checks the artifacts a
//! site build produced. Both accept a directory or an http(s) base URL as the
//! site root; `search` can route queries through the worker strategy for
//! parity testing.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "talpa",
    about = "Query runtime for static documentation search",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search a published site and display ranked results
    Search {
        /// Site root: a directory or an http(s) base URL
        site: String,

        /// Query text
        query: String,

        /// Docs version to scope results to
        #[arg(long)]
        docs_version: String,

        /// Execute the query on a worker thread instead of in-process
        #[arg(long)]
        worker: bool,

        /// Maximum number of results to display
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Inspect the search artifacts a site build produced
    Inspect {
        /// Site root: a directory or an http(s) base URL
        site: String,
    },
}
