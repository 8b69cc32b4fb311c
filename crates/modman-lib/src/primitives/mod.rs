//! modman primitives - core types, errors, and coordination
//!
//! Shared vocabulary for the rest of the crate: log settings that the
//! configuration layer hands to the logger, the mod loader enum used by the
//! manifest and the catalog, and the configuration/logger error types.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

mod shared;
use shared::impl_value_enum_text;

/// Available log output streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stderr,
    Stdout,
}

/// Console log levels, ordered from least to most verbose
///
/// `Critical` only differs from `Error` in name: both map to the `error`
/// tracing level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Critical = 0,
    Error = 1,
    Warning = 2,
    Info = 3,
    Debug = 4,
}

/// Output formats for console logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact single-line text
    Text,
    /// One JSON object per event
    Json,
    /// Multi-line human oriented output
    Pretty,
}

/// User intent for coloured output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// Mod loader a server runs
///
/// Loader strings this build does not know deserialize to `Unknown`, which
/// never matches a catalog version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModLoader {
    Fabric,
    Forge,
    Quilt,
    #[serde(other)]
    Unknown,
}

impl ModLoader {
    /// Catalog facet/query value for this loader
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fabric => "fabric",
            Self::Forge => "forge",
            Self::Quilt => "quilt",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Result ordering for catalog searches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchSort {
    #[default]
    Relevance,
    Downloads,
    Created,
    Updated,
}

impl SearchSort {
    /// Modrinth `index` query value
    pub fn index(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Downloads => "downloads",
            Self::Created => "newest",
            Self::Updated => "updated",
        }
    }
}

/// Ordering key for changelog listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChangelogSort {
    #[default]
    Date,
    Downloads,
    ChangelogSize,
    VersionNumber,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

// ============================================================================
// LOGGER CONFIGURATION TYPES
// ============================================================================

/// Everything the logger needs, resolved from `AppConfig`
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    pub color: bool,
    /// Debug-level log file; `None` disables file logging
    pub file: Option<PathBuf>,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Critical | LogLevel::Error => "error",
            LogLevel::Warning => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    /// Check if a message at this level is shown at `current_level`
    pub fn should_log(&self, current_level: LogLevel) -> bool {
        *self <= current_level
    }
}

// ============================================================================
// STRUCTURED ERROR TYPES
// ============================================================================

/// Application configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load environment file '{file}': {source}")]
    EnvFileError {
        file: String,
        source: dotenvy::Error,
    },

    #[error("Invalid working directory: {path}")]
    InvalidWorkDir { path: String },

    #[error("Failed to parse environment variables: {source}")]
    EnvironmentParsingFailed {
        #[from]
        source: envy::Error,
    },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Failed to get current directory: {source}")]
    CurrentDirError {
        #[from]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration value '{value}': {reason}")]
    ParseError { value: String, reason: String },
}

/// Logger initialization errors
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Failed to initialize tracing subscriber: {reason}")]
    InitializationFailed { reason: String },

    #[error("Failed to open log file '{path}': {source}")]
    LogFileError {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ============================================================================
// CLAP VALUE ENUMS
// ============================================================================

impl ValueEnum for LogLevel {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self::Debug,
            Self::Info,
            Self::Warning,
            Self::Error,
            Self::Critical,
        ]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        use clap::builder::PossibleValue;
        match self {
            Self::Debug => Some(PossibleValue::new("DEBUG").alias("trace")),
            Self::Info => Some(PossibleValue::new("INFO").alias("information")),
            Self::Warning => Some(PossibleValue::new("WARNING").alias("warn")),
            Self::Error => Some(PossibleValue::new("ERROR").alias("err")),
            Self::Critical => Some(PossibleValue::new("CRITICAL").alias("fatal")),
        }
    }
}

impl ValueEnum for LogFormat {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Text, Self::Json, Self::Pretty]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        use clap::builder::PossibleValue;
        match self {
            Self::Text => Some(PossibleValue::new("text").alias("txt").alias("plain")),
            Self::Json => Some(PossibleValue::new("json")),
            Self::Pretty => Some(PossibleValue::new("pretty")),
        }
    }
}

impl ValueEnum for LogOutput {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Stderr, Self::Stdout]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        use clap::builder::PossibleValue;
        match self {
            Self::Stderr => Some(PossibleValue::new("stderr")),
            Self::Stdout => Some(PossibleValue::new("stdout")),
        }
    }
}

impl ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Auto, Self::Always, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        use clap::builder::PossibleValue;
        match self {
            Self::Auto => Some(PossibleValue::new("auto").alias("detect")),
            Self::Always => Some(PossibleValue::new("always").alias("force").alias("on")),
            Self::Never => Some(PossibleValue::new("never").alias("off")),
        }
    }
}

impl ValueEnum for ModLoader {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Fabric, Self::Forge, Self::Quilt]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        use clap::builder::PossibleValue;
        match self {
            Self::Fabric => Some(PossibleValue::new("fabric")),
            Self::Forge => Some(PossibleValue::new("forge")),
            Self::Quilt => Some(PossibleValue::new("quilt")),
            Self::Unknown => Some(PossibleValue::new("unknown").hide(true)),
        }
    }
}

impl ValueEnum for SearchSort {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Relevance, Self::Downloads, Self::Created, Self::Updated]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        use clap::builder::PossibleValue;
        match self {
            Self::Relevance => Some(PossibleValue::new("relevance")),
            Self::Downloads => Some(PossibleValue::new("downloads")),
            Self::Created => Some(PossibleValue::new("created").alias("newest")),
            Self::Updated => Some(PossibleValue::new("updated")),
        }
    }
}

impl ValueEnum for ChangelogSort {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self::Date,
            Self::Downloads,
            Self::ChangelogSize,
            Self::VersionNumber,
        ]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        use clap::builder::PossibleValue;
        match self {
            Self::Date => Some(PossibleValue::new("date")),
            Self::Downloads => Some(PossibleValue::new("downloads")),
            Self::ChangelogSize => Some(PossibleValue::new("changelog-size")),
            Self::VersionNumber => Some(PossibleValue::new("version-number")),
        }
    }
}

impl ValueEnum for SortDirection {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Asc, Self::Desc]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        use clap::builder::PossibleValue;
        match self {
            Self::Asc => Some(PossibleValue::new("asc").alias("ascending")),
            Self::Desc => Some(PossibleValue::new("desc").alias("descending")),
        }
    }
}

impl_value_enum_text!(LogLevel, "invalid log level");
impl_value_enum_text!(LogFormat, "invalid log format");
impl_value_enum_text!(LogOutput, "invalid log output stream");
impl_value_enum_text!(ColorChoice, "invalid color choice");
impl_value_enum_text!(ModLoader, "unsupported mod loader");
impl_value_enum_text!(SearchSort, "unknown search order");
impl_value_enum_text!(ChangelogSort, "unknown changelog order");
impl_value_enum_text!(SortDirection, "sort direction must be asc or desc");

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
