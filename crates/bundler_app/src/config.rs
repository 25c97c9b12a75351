use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bundler_engine::{BundleOptions, EngineConfig, FetchSettings, BROWSER_USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::cli::Args;

pub const DEFAULT_CONFIG_FILENAME: &str = "bundler.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    pub comment: bool,
    pub keep_scripts: bool,
    pub full_url: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        let options = BundleOptions::default();
        Self {
            comment: options.provenance,
            keep_scripts: options.keep_scripts,
            full_url: options.absolute_urls,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub cache_dir: PathBuf,
    /// Also log to this file when set.
    pub log_file: Option<PathBuf>,
    pub options: OptionsConfig,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            output_dir: PathBuf::from("output"),
            cache_dir: PathBuf::from(".cache"),
            log_file: None,
            options: OptionsConfig::default(),
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            redirect_limit: fetch.redirect_limit,
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

impl AppConfig {
    /// Reads the config file. A missing `./bundler.ron` yields defaults; any
    /// other problem is returned as a message so the caller can log it once
    /// logging is up and continue with defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        let path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));

        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
                return Ok(Self::default());
            }
            Err(err) => return Err(format!("Failed to read config from {path:?}: {err}")),
        };

        Self::parse(&content).map_err(|err| format!("Failed to parse config from {path:?}: {err}"))
    }

    pub fn parse(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    /// Command-line flags win over file values.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(dir) = &args.output_dir {
            self.output_dir = dir.clone();
        }
        if args.no_comment {
            self.options.comment = false;
        }
        if args.no_scripts {
            self.options.keep_scripts = false;
        }
        if args.keep_relative {
            self.options.full_url = false;
        }
    }

    pub fn bundle_options(&self) -> BundleOptions {
        BundleOptions {
            provenance: self.options.comment,
            keep_scripts: self.options.keep_scripts,
            absolute_urls: self.options.full_url,
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            redirect_limit: self.redirect_limit,
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            fetch: self.fetch_settings(),
            options: self.bundle_options(),
            ..EngineConfig::default()
        }
    }
}
