//! Application configuration management
//!
//! Precedence: defaults -> .env -> MODMAN_* env vars -> CLI args. Clap reads
//! both the flags and their environment variables; `.env` files are loaded
//! into the environment before parsing.

use crate::api::fabric::DEFAULT_META_URL;
use crate::api::modrinth::DEFAULT_BASE_URL;
use crate::networking::NetworkingConfig;
use crate::primitives::*;
use clap::Args;
use serde::Deserialize;
use std::path::PathBuf;

/// Default configuration values
pub mod defaults {
    pub const LOG_LEVEL: &str = "WARNING";
    pub const LOG_FORMAT: &str = "text";
    pub const LOG_OUTPUT: &str = "stderr";
    pub const NET_TIMEOUT: &str = "30";
    pub const JOBS: &str = "4";
    pub const RETRIES: &str = "5";
    pub const COLOR: &str = "auto";
    pub const LOG_FILE_NAME: &str = "modman.log";
}

mod default_fns {
    use super::*;

    pub fn log_level() -> LogLevel {
        LogLevel::Warning
    }

    pub fn log_format() -> LogFormat {
        LogFormat::Text
    }

    pub fn log_output() -> LogOutput {
        LogOutput::Stderr
    }

    pub fn net_timeout() -> u64 {
        30
    }

    pub fn jobs() -> usize {
        4
    }

    pub fn retries() -> u32 {
        5
    }

    pub fn api_url() -> String {
        DEFAULT_BASE_URL.to_string()
    }

    pub fn fabric_meta_url() -> String {
        DEFAULT_META_URL.to_string()
    }

    pub fn color() -> ColorChoice {
        ColorChoice::Auto
    }
}

/// Global options, accepted before the subcommand
#[derive(Debug, Clone, Args, Deserialize)]
pub struct AppConfig {
    /// Server directory (defaults to the current directory)
    #[arg(short, long, env = "MODMAN_WORKDIR")]
    #[serde(default)]
    pub workdir: Option<PathBuf>,

    /// Console log level
    #[arg(
        short = 'L',
        long,
        env = "MODMAN_LOG_LEVEL",
        ignore_case = true,
        default_value = defaults::LOG_LEVEL
    )]
    #[serde(default = "default_fns::log_level")]
    pub log_level: LogLevel,

    /// Console log format
    #[arg(long, env = "MODMAN_LOG_FORMAT", default_value = defaults::LOG_FORMAT)]
    #[serde(default = "default_fns::log_format")]
    pub log_format: LogFormat,

    /// Console log stream
    #[arg(long, env = "MODMAN_LOG_OUTPUT", default_value = defaults::LOG_OUTPUT)]
    #[serde(default = "default_fns::log_output")]
    pub log_output: LogOutput,

    /// Debug log file (defaults to modman.log in the user cache directory)
    #[arg(long, env = "MODMAN_LOG_FILE")]
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Disable the debug log file
    #[arg(long, env = "MODMAN_NO_LOG_FILE")]
    #[serde(default)]
    pub no_log_file: bool,

    /// HTTP timeout in seconds
    #[arg(long, env = "MODMAN_NET_TIMEOUT", default_value = defaults::NET_TIMEOUT)]
    #[serde(default = "default_fns::net_timeout")]
    pub net_timeout: u64,

    /// Concurrent downloads
    #[arg(short, long, env = "MODMAN_JOBS", default_value = defaults::JOBS)]
    #[serde(default = "default_fns::jobs")]
    pub jobs: usize,

    /// Attempts per request on rate limiting or connection failures
    #[arg(long, env = "MODMAN_RETRIES", default_value = defaults::RETRIES)]
    #[serde(default = "default_fns::retries")]
    pub retries: u32,

    /// Modrinth API base URL
    #[arg(long, env = "MODMAN_API_URL", default_value = DEFAULT_BASE_URL, hide = true)]
    #[serde(default = "default_fns::api_url")]
    pub api_url: String,

    /// Fabric meta base URL
    #[arg(long, env = "MODMAN_FABRIC_META_URL", default_value = DEFAULT_META_URL, hide = true)]
    #[serde(default = "default_fns::fabric_meta_url")]
    pub fabric_meta_url: String,

    /// Colour output (auto, always, never)
    #[arg(long, env = "MODMAN_COLOR", default_value = defaults::COLOR)]
    #[serde(default = "default_fns::color")]
    pub color: ColorChoice,

    /// Never prompt; take the first search match
    #[arg(short, long, env = "MODMAN_YES")]
    #[serde(default)]
    pub yes: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workdir: None,
            log_level: default_fns::log_level(),
            log_format: default_fns::log_format(),
            log_output: default_fns::log_output(),
            log_file: None,
            no_log_file: false,
            net_timeout: default_fns::net_timeout(),
            jobs: default_fns::jobs(),
            retries: default_fns::retries(),
            api_url: default_fns::api_url(),
            fabric_meta_url: default_fns::fabric_meta_url(),
            color: default_fns::color(),
            yes: false,
        }
    }
}

/// `modman.log` in the platform cache directory
pub fn default_log_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "modman")
        .map(|dirs| dirs.cache_dir().join(defaults::LOG_FILE_NAME))
}

impl AppConfig {
    /// Resolve `color` to on/off for this terminal
    pub fn color_enabled(&self) -> bool {
        match self.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => console::colors_enabled(),
        }
    }

    pub fn to_logger_config(&self) -> LoggerConfig {
        let file = if self.no_log_file {
            None
        } else {
            self.log_file.clone().or_else(default_log_file)
        };
        LoggerConfig {
            level: self.log_level,
            format: self.log_format,
            output: self.log_output,
            color: self.color_enabled(),
            file,
        }
    }

    pub fn to_networking_config(&self) -> NetworkingConfig {
        NetworkingConfig {
            jobs: self.jobs,
            timeout_seconds: self.net_timeout,
            retries: self.retries,
        }
    }

    /// Validate the final configuration and resolve the working directory
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.jobs == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "--jobs must be at least 1".to_string(),
            });
        }
        if self.retries == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "--retries must be at least 1".to_string(),
            });
        }
        if self.net_timeout == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "--net-timeout must be at least 1 second".to_string(),
            });
        }

        match &self.workdir {
            Some(dir) if !dir.is_dir() => {
                return Err(ConfigError::InvalidWorkDir {
                    path: dir.display().to_string(),
                });
            }
            Some(_) => {}
            None => self.workdir = Some(std::env::current_dir()?),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    include!("config.test.rs");
}
