mod error;
mod logging;
mod sent_mail;
mod settings;

use anyhow::{anyhow, Result};
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

/// Search the Sent folder by subject, then export the recipients or delete
/// the matching messages.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// YAML settings file (defaults to src/resources/settings.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// off, error, warn, info, debug or trace
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let level: LevelFilter = args
        .log_level
        .parse()
        .map_err(|_| anyhow!("unknown log level {:?}", args.log_level))?;
    logging::setup_logger(level, args.log_file.as_deref())?;

    let settings = settings::load_settings(args.config.as_deref())?;
    sent_mail::main(settings).await
}
