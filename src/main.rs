//! rscp - inspect and build RSCP frames from the command line.
//!
//! Decodes captured frames (hex or binary files), encodes frames from JSON
//! element descriptions, verifies checksums and lists the tag catalog.
//!
//! Configuration can be provided via:
//! - YAML config file (--config or RSCP_CONFIG env var)
//! - Environment variables (RSCP_STRICT_MAGIC, RSCP_VERIFY_CHECKSUM, etc.)

mod commands;
mod config;
mod error;

use clap::{Parser, Subcommand};
use colored::Colorize;
use config::{Config, OutputFormat};
use error::CliError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rscp")]
#[command(about = "Encode, decode and verify RSCP frames")]
#[command(version)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "RSCP_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (overrides config)
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a frame and print its elements
    Decode {
        /// Frame bytes as hex
        hex: Option<String>,

        /// Read raw frame bytes from a file instead
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Skip checking the CRC32 trailer
        #[arg(long)]
        no_verify_checksum: bool,

        /// Accept frames with unexpected magic bytes
        #[arg(long)]
        lenient_magic: bool,

        /// Print container payloads without decoding children
        #[arg(long)]
        no_expand: bool,
    },

    /// Encode a frame from JSON and print it as hex
    Encode {
        /// Element JSON (or @file.json to read from file)
        input: String,

        /// Omit the CRC32 trailer
        #[arg(long)]
        no_checksum: bool,

        /// Write raw frame bytes to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Check the CRC32 trailer of a frame
    Verify {
        /// Frame bytes as hex
        hex: Option<String>,

        /// Read raw frame bytes from a file instead
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// List known tags
    Tags {
        /// Only tags of this namespace (e.g. BAT, EMS)
        #[arg(short, long)]
        namespace: Option<String>,
    },
}

fn main() {
    // Logs go to stderr so decoded output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<String, CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(format) = cli.output {
        config.output.format = format;
    }
    tracing::debug!("effective config: {:?}", config);

    commands::execute(cli.command, &config)
}
