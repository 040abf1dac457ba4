//! Linear regression service CLI
//!
//! Trains models from TSV observations, applies stored models and shows
//! server usage statistics over HTTP or gRPC.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use client::Protocol;
use output::OutputFormat;

/// Linear regression service CLI
#[derive(Parser)]
#[command(name = "slr")]
#[command(author, version, about = "CLI for the linear regression service", long_about = None)]
pub struct Cli {
    /// Server address (defaults to localhost on the protocol's port)
    #[arg(long, env = "SLR_SERVER")]
    pub server: Option<String>,

    /// Wire protocol
    #[arg(long, short, env = "SLR_PROTOCOL")]
    pub protocol: Option<Protocol>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a model from `x y [weight]` lines
    Train {
        /// Read observations from a file instead of stdin
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Do not store the trained model
        #[arg(long)]
        no_store: bool,
    },

    /// Apply a stored model to arguments (or to each stdin line)
    Apply {
        /// Model name returned by `train`
        #[arg(long, short)]
        model: String,

        /// Arguments to evaluate
        #[arg(allow_negative_numbers = true)]
        args: Vec<String>,
    },

    /// Show server usage statistics
    Stats,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;

    let protocol = cli.protocol.or(config.protocol).unwrap_or_default();
    let format = cli.format.or(config.format).unwrap_or_default();
    let server = cli
        .server
        .or(config.server)
        .unwrap_or_else(|| protocol.default_server().to_string());

    let client = client::connect(protocol, &server)?;

    match cli.command {
        Commands::Train { input, no_store } => {
            commands::train::train(client.as_ref(), input.as_deref(), !no_store, format).await
        }
        Commands::Apply { model, args } => {
            commands::apply::apply(client.as_ref(), &model, &args, format).await
        }
        Commands::Stats => commands::stats::stats(client.as_ref(), format).await,
    }
}
