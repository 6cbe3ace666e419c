mod cli;
mod config;
mod view;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use engine_logging::{engine_info, engine_warn, level_from_verbosity, LogDestination};
use news_engine::{NewsSession, ReqwestNewsGateway};

use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    engine_logging::initialize(destination, level_from_verbosity(cli.verbose));

    let mut config = config::load(&cli.config);
    config.apply_cli(&cli);
    if config.api_key.is_none() {
        engine_warn!("No API key configured; the news endpoint will likely reject requests");
    }

    let gateway =
        ReqwestNewsGateway::new(config.fetch_settings()).context("building HTTP client")?;
    let session = NewsSession::new(Arc::new(gateway), config.session_config())
        .context("starting news session")?;
    engine_info!(
        "Browsing {} headlines from {}",
        config.country,
        config.base_url
    );

    let stdout = io::stdout();
    if cli.interactive {
        view::run_interactive(&session, stdout.lock())?;
    } else {
        view::run_batch(&session, cli.pages, stdout.lock())?;
    }

    session.shutdown().context("news pipeline failed")?;
    Ok(())
}
