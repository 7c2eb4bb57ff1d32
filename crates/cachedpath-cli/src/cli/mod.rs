//! CLI for the cachedpath resolver.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{run_completions, run_resolve, run_schemes, ResolveFlags};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cachedpath")]
#[command(about = "Resolve a local path or URL (optionally archive!entry) to a cached local file", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve an identifier and print the local path.
    Resolve {
        /// Local path or URL, optionally followed by `!entry` inside an archive.
        identifier: String,

        /// Cache root (overrides config and CACHED_PATH_CACHE_ROOT).
        #[arg(long, value_name = "DIR")]
        cache_dir: Option<PathBuf>,

        /// Extract archives and print the extraction directory.
        #[arg(long)]
        extract: bool,

        /// Re-extract even if the extraction directory exists.
        #[arg(long)]
        force_extract: bool,

        /// Do not report download progress.
        #[arg(long, short)]
        quiet: bool,

        /// Extra request header, e.g. -H 'Authorization: Bearer TOKEN'. Repeatable.
        #[arg(short = 'H', long = "header", value_name = "NAME: VALUE", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Per-request timeout in seconds.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Retries after the first attempt.
        #[arg(long, value_name = "N")]
        max_retries: Option<u32>,

        /// Linear backoff unit in milliseconds.
        #[arg(long, value_name = "MS")]
        retry_delay_ms: Option<u64>,
    },

    /// List the URL schemes that can be fetched.
    Schemes,

    /// Print shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// `Name: value` → (name, value), both trimmed.
fn parse_header(s: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name: value', got {s:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in {s:?}"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Resolve {
                identifier,
                cache_dir,
                extract,
                force_extract,
                quiet,
                headers,
                timeout,
                max_retries,
                retry_delay_ms,
            } => {
                let flags = ResolveFlags {
                    cache_dir,
                    extract,
                    force_extract,
                    quiet,
                    headers,
                    timeout,
                    max_retries,
                    retry_delay_ms,
                };
                run_resolve(&identifier, flags)?;
            }
            CliCommand::Schemes => run_schemes()?,
            CliCommand::Completions { shell } => run_completions(shell)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
