//! Composer CLI - Terminal host for the chat message composer
//!
//! Stages local files, compresses images the way the composer does before
//! upload, and sends messages with attachments to a chat room.

mod cli;
mod commands;
mod error;
mod terminal;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::{load_config, resolve_config_path};
use crate::commands::compress::run_compress;
use crate::commands::config::run_config;
use crate::commands::send::{run_send, SendOptions};
use crate::commands::stage::run_stage;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                "composer=info"
                    .parse()
                    .map_err(|error| CliError::Config(format!("Invalid log directive: {error}")))?,
            ),
        )
        .init();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config);

    match cli.command {
        Commands::Compress {
            input,
            output,
            budget,
            quality,
        } => {
            let config = load_config(&config_path)?;
            run_compress(&config, &input, output.as_deref(), budget, quality).await?;
        }
        Commands::Stage { files, html } => {
            let config = load_config(&config_path)?;
            run_stage(&config, &files, html)?;
        }
        Commands::Send {
            text,
            files,
            server,
            room,
            csrf_token,
        } => {
            let config = load_config(&config_path)?;
            let options = SendOptions {
                text,
                files,
                server,
                room,
                csrf_token,
            };
            run_send(config, options).await?;
        }
        Commands::Config { command } => run_config(command, &config_path)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
