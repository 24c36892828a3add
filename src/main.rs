//! # Tinicly - Main Entry Point
//!
//! ## Execution flow:
//! 1. Parse CLI arguments with `clap`
//! 2. Set up `tracing` (warn by default, debug with `--verbose`, `RUST_LOG` wins)
//! 3. Build the `Config` from the settings file and CLI overrides
//! 4. Resolve the token, before touching the filesystem
//! 5. Run the `TinifyRunner` and print its summary
//!
//! ## Example:
//! ```bash
//! tinicly assets/ --token $KEY --max-uploads 4
//! tinicly assets/ --check
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tinicly::config::{resolve_token, TOKEN_ENV};
use tinicly::{Config, TinifyClient, TinifyRunner};

#[derive(Parser)]
#[command(name = "tinicly", version)]
#[command(about = "Check and optimize PNG/JPEG images with the Tinify API")]
struct Args {
    /// File or directory to process
    path: PathBuf,

    /// Tinify API token (defaults to the TINIFY_KEY environment variable)
    #[arg(long)]
    token: Option<String>,

    /// Only report files that are not tinified, never upload or rewrite them
    #[arg(long)]
    check: bool,

    /// Number of blocking workers (decoding, file reads and writes)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Maximum number of concurrent uploads
    #[arg(long)]
    max_uploads: Option<usize>,

    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exit successfully even when some files failed
    #[arg(long)]
    ignore_errors: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            println!("❎ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    init_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("cannot load settings from {}", path.display()))?,
        None => Config::default(),
    };

    config.root = args.path;
    config.check = args.check;
    config.token = resolve_token(args.token, std::env::var(TOKEN_ENV).ok()).unwrap_or_default();
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(max_uploads) = args.max_uploads {
        config.max_uploads = max_uploads;
    }
    if args.ignore_errors {
        config.fail_on_error = false;
    }

    // Missing token is reported here, before any scan
    config.validate()?;
    debug!("Configuration: {:?}", Config { token: "***".into(), ..config.clone() });

    let client = TinifyClient::with_endpoint(&config.endpoint)?;
    let summary = TinifyRunner::new(config, client).run().await?;

    summary.emit();
    Ok(summary.exit_code())
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "tinicly=debug,warn" } else { "warn" })
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
