//! Subcommand implementations.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chunkwire_protocol::{Compression, split_messages};
use chunkwire_transfer::{Assembler, DEFAULT_CHUNK_SIZE, EncodeOptions, Reply, encode_transfer};
use clap::Args;

use crate::config::{FileConfig, Overrides};

/// Split a file into frames and print them.
#[derive(Debug, Args)]
pub struct ChunkArgs {
    /// File to send.
    #[arg(long)]
    pub file: PathBuf,

    /// Destination path announced to the receiver (relative to its root).
    #[arg(long)]
    pub dst: String,

    /// Encoded characters per chunk frame.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Send the bytes uncompressed.
    #[arg(long)]
    pub no_gzip: bool,

    /// Transfer id (a UUID is generated otherwise).
    #[arg(long)]
    pub id: Option<String>,
}

/// Feed a transcript of frames to an assembler and print one ACK per frame.
#[derive(Debug, Args)]
pub struct AssembleArgs {
    /// Transcript containing the frames.
    #[arg(long)]
    pub input: PathBuf,

    /// Directory received files are written below.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Channel key the frames are scoped to.
    #[arg(long)]
    pub channel: Option<String>,

    /// Session lifetime in seconds.
    #[arg(long)]
    pub ttl_secs: Option<u64>,

    /// TOML config file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn chunk(args: &ChunkArgs, out: &mut impl Write) -> anyhow::Result<()> {
    if args.chunk_size == 0 {
        anyhow::bail!("--chunk-size must be at least 1");
    }
    let data = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let options = EncodeOptions {
        chunk_size: args.chunk_size,
        compression: if args.no_gzip {
            Compression::None
        } else {
            Compression::Gzip
        },
        id: args.id.clone(),
        ..EncodeOptions::new(&args.dst)
    };
    let encoded = encode_transfer(&data, &options)?;

    writeln!(out, "{}", encoded.to_transcript())?;
    tracing::info!(
        id = %encoded.id,
        parts = encoded.total_parts,
        bytes = data.len(),
        "file split into frames"
    );
    Ok(())
}

/// Outcome counts of an `assemble` run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AssembleSummary {
    pub frames: usize,
    pub completed: usize,
    pub failed: usize,
}

pub fn assemble(args: &AssembleArgs, out: &mut impl Write) -> anyhow::Result<AssembleSummary> {
    let receiver = FileConfig::load(args.config.as_deref())?.resolve(Overrides {
        root_dir: args.root.clone(),
        session_ttl_secs: args.ttl_secs,
        channel: args.channel.clone(),
    });
    let transcript = read_transcript(&args.input)?;
    let assembler = Assembler::new(receiver.assembler)?;
    tracing::info!(
        root = %assembler.root_dir().display(),
        channel = %receiver.channel,
        "assembling transcript"
    );

    let mut summary = AssembleSummary::default();
    for block in split_messages(&transcript) {
        let reply = match assembler.on_message(&block, &receiver.channel) {
            Ok(None) => continue,
            Ok(Some(ack)) => Reply::from(ack),
            Err(e) => Reply::from(&e),
        };
        summary.frames += 1;
        if !reply.ok {
            summary.failed += 1;
        } else if matches!(reply.ack, Some(chunkwire_transfer::Ack::End { .. })) {
            summary.completed += 1;
        }
        writeln!(out, "ACK: {}", reply.to_json()?)?;
    }

    tracing::info!(
        frames = summary.frames,
        completed = summary.completed,
        failed = summary.failed,
        "transcript processed"
    );
    Ok(summary)
}

fn read_transcript(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
