//! seekarc CLI
//!
//! Command-line front end for the seekable archive writer.
//!
//! # Commands
//!
//! - `pack` - Compress a file or stdin into a seekable archive
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use seekarc_core::{WriterConfig, DEFAULT_COMPRESSION_LEVEL, DEFAULT_MIN_FRAME_SIZE};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Seekable zstd archive tools.
#[derive(Parser)]
#[command(name = "seekarc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file (or stdin) into a seekable archive
    Pack {
        /// Input file; stdin when omitted or `-`
        input: Option<PathBuf>,

        /// Archive to create
        #[arg(short, long)]
        output: PathBuf,

        /// Engine worker threads (0 = compress on the calling thread)
        #[arg(short, long, default_value_t = 0)]
        workers: u32,

        /// Uncompressed bytes after which a new frame is started
        #[arg(short, long, default_value_t = DEFAULT_MIN_FRAME_SIZE)]
        min_frame_size: u64,

        /// Compression level
        #[arg(short, long, default_value_t = DEFAULT_COMPRESSION_LEVEL)]
        level: i32,

        /// Record per-frame checksums in the seek table
        #[arg(long)]
        checksums: bool,

        /// Bytes read from the input per write
        #[arg(long, default_value_t = commands::pack::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Pack {
            input,
            output,
            workers,
            min_frame_size,
            level,
            checksums,
            chunk_size,
        } => {
            let config = WriterConfig::new()
                .workers(workers)
                .min_frame_size(min_frame_size)
                .compression_level(level)
                .checksums(checksums);
            let input = input.filter(|p| p.as_os_str() != "-");
            commands::pack::run(input.as_deref(), &output, &config, chunk_size)?;
        }
        Commands::Version => {
            println!("seekarc CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("seekarc core v{}", seekarc_core::VERSION);
        }
    }

    Ok(())
}
