//! Application configuration loaded from an optional RON file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use news_core::{MergePolicy, DEFAULT_COUNTRY};
use news_engine::{FetchSettings, SessionConfig};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

pub const DEFAULT_CONFIG_FILE: &str = "news.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub country: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub page_size: Option<u32>,
    pub request_timeout_secs: u64,
    pub append_pages: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            base_url: fetch.base_url,
            api_key: None,
            page_size: None,
            request_timeout_secs: fetch.request_timeout.as_secs(),
            append_pages: false,
        }
    }
}

impl AppConfig {
    /// Command-line values win over file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(country) = &cli.country {
            self.country = country.clone();
        }
        if let Some(base_url) = &cli.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(api_key) = &cli.api_key {
            self.api_key = Some(api_key.clone());
        }
        if let Some(page_size) = cli.page_size {
            self.page_size = Some(page_size);
        }
        if cli.append {
            self.append_pages = true;
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            page_size: self.page_size,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..FetchSettings::default()
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            country: self.country.clone(),
            merge: if self.append_pages {
                MergePolicy::Append
            } else {
                MergePolicy::Replace
            },
        }
    }
}

/// Reads `path`, falling back to defaults when it is missing or unreadable.
pub fn load(path: &Path) -> AppConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return AppConfig::default();
        }
        Err(err) => {
            engine_warn!("Failed to read config from {:?}: {}", path, err);
            return AppConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            engine_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            engine_warn!("Failed to parse config from {:?}: {}", path, err);
            AppConfig::default()
        }
    }
}
