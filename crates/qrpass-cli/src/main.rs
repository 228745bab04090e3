//! # qrpass CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use qrpass_cli::digest::{run_digest, DigestArgs};
use qrpass_cli::render::{run_render, RenderArgs};
use qrpass_cli::token::{run_token, TokenArgs};

/// Operator tooling for QR trip passes.
#[derive(Parser, Debug)]
#[command(name = "qrpass", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the SHA-256 digest of a trip record.
    Digest(DigestArgs),

    /// Issue or inspect signed tokens.
    Token(TokenArgs),

    /// Render a payload as a PNG QR code.
    Render(RenderArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Digest(args) => run_digest(&args),
        Commands::Token(args) => run_token(&args),
        Commands::Render(args) => run_render(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
