use crate::primitives::{ChangelogSort, ConfigError, ModLoader, SearchSort, SortDirection};
use clap::{Parser, Subcommand};

use super::config::AppConfig;
use super::env::EnvironmentConfig;
use super::loader::load_env_files;

/// modman CLI - Minecraft server mod manager backed by Modrinth
#[derive(Debug, Clone, Parser)]
#[command(name = "modman")]
#[command(about = "Manage the mods of a Minecraft server from Modrinth")]
#[command(version)]
pub struct Cli {
    /// Global options (must precede the subcommand)
    #[command(flatten)]
    pub config: AppConfig,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Configuration loaded from the command line and environment
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub app_config: AppConfig,
    pub command: Option<Commands>,
}

impl CliConfig {
    /// Load config: defaults -> .env -> env vars -> CLI
    pub fn load() -> Result<Self, ConfigError> {
        load_env_files(&std::env::current_dir()?)?;
        Self::from_cli(Cli::parse(), &EnvironmentConfig::load()?)
    }

    /// Finish a parsed command line with the standard environment variables
    pub fn from_cli(cli: Cli, env: &EnvironmentConfig) -> Result<Self, ConfigError> {
        let mut app_config = cli.config;
        app_config.color = env.apply_color_config(app_config.color);
        if env.is_ci() {
            app_config.yes = true;
        }
        app_config.validate()?;

        Ok(Self {
            app_config,
            command: cli.command,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Commands {
    /// Create a manifest for the server in the working directory
    Init {
        /// Project name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,

        /// Do not detect the server jar or register existing mods
        #[arg(long)]
        no_auto: bool,

        /// Mod loader (detected from the server jar when omitted)
        loader: Option<ModLoader>,

        /// Minecraft version (detected from the server jar when omitted)
        game_version: Option<String>,
    },

    /// Install mods and their dependencies
    Install {
        /// Slugs or project ids, optionally pinned as `slug==version`;
        /// none re-checks every installed mod
        mods: Vec<String>,

        /// Reinstall even if already installed and intact
        #[arg(short = 'R', long)]
        reinstall: bool,

        /// Also install optional dependencies
        #[arg(short = 'O', long)]
        optional: bool,

        /// Show the plan without changing anything
        #[arg(short = 'D', long)]
        dry: bool,
    },

    /// Remove mods (their dependencies stay installed)
    Uninstall {
        /// Slugs, project ids, titles, jar names or paths to jars
        #[arg(required = true)]
        mods: Vec<String>,
    },

    /// Move mods to the newest compatible versions
    Update {
        /// Mods to update; none updates everything
        mods: Vec<String>,

        /// Switch the server to this Minecraft version first
        #[arg(short = 'V', long = "game-version")]
        game_version: Option<String>,

        /// Allow beta and alpha versions
        #[arg(short = 'P', long)]
        prerelease: bool,
    },

    /// Show installed mods and their state
    List,

    /// Zip the client-side mods into <name>.zip
    Pack {
        /// Also include mods that only run on the server
        #[arg(short = 'S', long = "server-side")]
        include_server_side: bool,
    },

    /// Download a Fabric server launcher
    DownloadFabric {
        /// Minecraft version, or `latest`
        mc_version: String,

        /// Fabric loader version (latest stable when omitted)
        loader: Option<String>,

        /// Fabric installer version (latest stable when omitted)
        installer: Option<String>,
    },

    /// Search Modrinth for server mods
    Search {
        query: String,

        /// Results per page, at most 100
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Result page, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        #[arg(short = 'S', long, value_enum, default_value_t = SearchSort::Relevance)]
        sort_by: SearchSort,
    },

    /// Show a Modrinth project page
    #[command(visible_aliases = ["info", "show"])]
    View {
        #[arg(value_name = "MOD")]
        project: String,
    },

    /// Show the changelogs of a mod's versions
    Changelog {
        #[arg(value_name = "MOD")]
        project: String,

        /// Version id or number, `latest`, or `oldest`; all versions when omitted
        version: Option<String>,

        /// Also show release age and download counts
        #[arg(short = 'V', long)]
        verbose: bool,

        #[arg(short = 'S', long, value_enum, default_value_t = ChangelogSort::Date)]
        sort_by: ChangelogSort,

        #[arg(short = 'D', long = "sort-direction", value_enum, default_value_t = SortDirection::Desc)]
        direction: SortDirection,

        /// How many versions to show
        #[arg(short = 'L', long, default_value_t = 10)]
        limit: usize,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Init { .. } => "init",
            Commands::Install { .. } => "install",
            Commands::Uninstall { .. } => "uninstall",
            Commands::Update { .. } => "update",
            Commands::List => "list",
            Commands::Pack { .. } => "pack",
            Commands::DownloadFabric { .. } => "download-fabric",
            Commands::Search { .. } => "search",
            Commands::View { .. } => "view",
            Commands::Changelog { .. } => "changelog",
        }
    }
}

#[cfg(test)]
mod tests {
    include!("cli.test.rs");
}
