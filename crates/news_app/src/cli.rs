use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_CONFIG_FILE;

/// Browse top headlines from the terminal.
#[derive(Debug, Clone, Parser)]
#[command(name = "news", version, about)]
pub struct Cli {
    /// RON configuration file; missing files fall back to defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Two-letter country code of the headlines.
    #[arg(long)]
    pub country: Option<String>,

    /// Number of pages to request in batch mode.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,

    #[arg(long)]
    pub page_size: Option<u32>,

    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long)]
    pub base_url: Option<String>,

    /// Append later pages to the list instead of replacing it.
    #[arg(long)]
    pub append: bool,

    /// Read `more`, `reattach` and `quit` commands from stdin.
    #[arg(short, long)]
    pub interactive: bool,

    /// Also write logs to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
