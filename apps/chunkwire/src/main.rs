//! chunkwire command-line entry point.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "chunkwire", version, about = "Send files through text-only channels")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the frames for a file.
    Chunk(commands::ChunkArgs),
    /// Reassemble files from a transcript of frames.
    Assemble(commands::AssembleArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries frames and ACKs.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "starting chunkwire");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Chunk(args) => commands::chunk(&args, &mut out)?,
        Command::Assemble(args) => {
            let summary = commands::assemble(&args, &mut out)?;
            if summary.failed > 0 {
                tracing::warn!(failed = summary.failed, "some frames were rejected");
            }
        }
    }
    Ok(())
}
