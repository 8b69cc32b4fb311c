//! # modman Library
//!
//! Minecraft server mod management on top of Modrinth.
//!
//! ## Core Modules
//!
//! - [`primitives`] - Foundation types and configuration errors
//! - [`logger`] - Structured logging with progress tracking
//! - [`networking`] - Rate-limited HTTP client with concurrency management
//! - [`api`] - Modrinth catalog and Fabric meta clients
//! - [`modman`] - Manifest, resolution, reconciliation, downloads and packing
//! - [`display`] - User-facing terminal output
//! - [`application`] - CLI interface, configuration and command handlers
//!
//! ## Quick Start
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! let report = modman_lib::main().await?;
//! std::process::exit(if report.is_success() { 0 } else { 1 });
//! # }
//! ```

pub mod api;
pub mod application;
pub mod display;
pub mod logger;
pub mod modman;
pub mod networking;
pub mod primitives;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use application::{AppConfig, Cli, CommandReport, Commands, execute_command};
pub use logger::Logger;
pub use networking::{NetworkingConfig, NetworkingManager};
pub use primitives::{ConfigError, LogFormat, LogLevel, LogOutput, LoggerError, ModLoader};

use anyhow::Result;
use application::CliConfig;

/// Parse the command line and run the requested command
pub async fn main() -> Result<CommandReport> {
    let config = CliConfig::load()?;
    execute_command(config).await
}
