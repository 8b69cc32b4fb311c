use crate::primitives::*;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events follow the requested level; everything else stays at warn
const OWN_TARGETS: &[&str] = &["modman", "modman_lib"];

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Handle for the installed tracing subscriber
#[derive(Debug)]
pub struct Logger {
    level: LogLevel,
    file_logging: bool,
}

impl Logger {
    /// Install the process-wide subscriber
    ///
    /// Console output honours `config.level` (or `RUST_LOG` when set); the
    /// optional log file always records debug events.
    pub fn init(config: LoggerConfig) -> Result<Self, LoggerError> {
        let indicatif_layer = IndicatifLayer::new();

        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(filter_directives(config.level)));

        let console_layer: BoxedLayer = match (config.output, config.format) {
            (LogOutput::Stderr, LogFormat::Text) => fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_ansi(config.color)
                .with_target(false)
                .compact()
                .with_filter(console_filter)
                .boxed(),
            (LogOutput::Stderr, LogFormat::Json) => fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_ansi(false)
                .json()
                .with_filter(console_filter)
                .boxed(),
            (LogOutput::Stderr, LogFormat::Pretty) => fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_ansi(config.color)
                .pretty()
                .with_filter(console_filter)
                .boxed(),
            (LogOutput::Stdout, LogFormat::Text) => fmt::layer()
                .with_writer(indicatif_layer.get_stdout_writer())
                .with_ansi(config.color)
                .with_target(false)
                .compact()
                .with_filter(console_filter)
                .boxed(),
            (LogOutput::Stdout, LogFormat::Json) => fmt::layer()
                .with_writer(indicatif_layer.get_stdout_writer())
                .with_ansi(false)
                .json()
                .with_filter(console_filter)
                .boxed(),
            (LogOutput::Stdout, LogFormat::Pretty) => fmt::layer()
                .with_writer(indicatif_layer.get_stdout_writer())
                .with_ansi(config.color)
                .pretty()
                .with_filter(console_filter)
                .boxed(),
        };

        let mut layers = vec![console_layer];
        if let Some(path) = &config.file {
            layers.push(file_layer(path)?);
        }

        tracing_subscriber::registry()
            .with(layers)
            .with(indicatif_layer)
            .try_init()
            .map_err(|e| LoggerError::InitializationFailed {
                reason: e.to_string(),
            })?;

        tracing::debug!(
            level = %config.level,
            format = %config.format,
            log_file = ?config.file,
            "logger initialized"
        );

        Ok(Self {
            level: config.level,
            file_logging: config.file.is_some(),
        })
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn file_logging(&self) -> bool {
        self.file_logging
    }
}

/// EnvFilter directives for the console at `level`
pub fn filter_directives(level: LogLevel) -> String {
    let level = level.as_directive();
    let own: Vec<String> = OWN_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect();
    format!(
        "warn,{},hyper_util=warn,reqwest=warn,h2=warn,rustls=warn",
        own.join(",")
    )
}

fn file_layer(path: &Path) -> Result<BoxedLayer, LoggerError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| LoggerError::LogFileError {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggerError::LogFileError {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_filter(EnvFilter::new(filter_directives(LogLevel::Debug)))
        .boxed())
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
