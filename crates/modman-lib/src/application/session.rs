//! Command session architecture
//!
//! Each command execution creates a session that owns all ephemeral state:
//! the HTTP stack, the catalog client with its per-run cache, the manifest
//! store and the display/interactive providers. Handlers only see the
//! [`Session`] trait, so tests can swap any provider.

use crate::api::cache::CachedCatalog;
use crate::api::fabric::FabricMetaClient;
use crate::api::modrinth::{CatalogClient, LiveModrinthClient};
use crate::application::config::AppConfig;
use crate::display::{DisplayProvider, LiveDisplayProvider};
use crate::modman::manifest::{JsonManifestStore, ManifestStore};
use crate::networking::NetworkingManager;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Provider trait for configuration access
pub trait ConfigProvider {
    fn app_config(&self) -> &AppConfig;
}

/// Provider trait for interactive user input operations
pub trait InteractiveProvider {
    /// Prompt for confirmation (yes/no)
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Prompt for fuzzy selection from a list of options
    /// Returns Some(index) if user selected, None if user pressed ESC
    fn fuzzy_select(&self, prompt: &str, options: &[String]) -> Result<Option<usize>>;
}

/// Everything a command handler may touch
pub trait Session {
    fn display(&self) -> &dyn DisplayProvider;

    fn config(&self) -> &dyn ConfigProvider;

    fn interactive(&self) -> &dyn InteractiveProvider;

    /// Modrinth catalog (cached for the lifetime of the session)
    fn catalog(&self) -> &dyn CatalogClient;

    fn fabric(&self) -> &FabricMetaClient;

    fn manifest_store(&self) -> &dyn ManifestStore;

    fn networking(&self) -> &NetworkingManager;

    /// Directory the command was started in
    fn workdir(&self) -> &Path;
}

/// Live implementation of ConfigProvider
pub struct LiveConfigProvider {
    app_config: AppConfig,
}

impl LiveConfigProvider {
    pub fn new(app_config: AppConfig) -> Self {
        Self { app_config }
    }
}

impl ConfigProvider for LiveConfigProvider {
    fn app_config(&self) -> &AppConfig {
        &self.app_config
    }
}

/// Live implementation of InteractiveProvider
pub struct LiveInteractiveProvider {
    yes_mode: bool,
}

impl LiveInteractiveProvider {
    pub fn new(yes_mode: bool) -> Self {
        Self { yes_mode }
    }

    fn is_tty() -> bool {
        use std::io::IsTerminal;
        std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
    }
}

impl InteractiveProvider for LiveInteractiveProvider {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.yes_mode || !Self::is_tty() {
            return Ok(default);
        }

        use dialoguer::Confirm;

        Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .context("Failed to read confirmation")
    }

    fn fuzzy_select(&self, prompt: &str, options: &[String]) -> Result<Option<usize>> {
        if options.is_empty() {
            return Ok(None);
        }
        // Non-interactive: the first (best ranked) option wins
        if self.yes_mode || !Self::is_tty() {
            return Ok(Some(0));
        }

        use dialoguer::FuzzySelect;

        FuzzySelect::new()
            .with_prompt(prompt)
            .items(options)
            .default(0)
            .max_length(8)
            .interact_opt()
            .context("Failed to read fuzzy selection")
    }
}

/// CommandSession owns all ephemeral state for a single command execution
pub struct CommandSession<D = LiveDisplayProvider, I = LiveInteractiveProvider>
where
    D: DisplayProvider,
    I: InteractiveProvider,
{
    display_provider: D,
    config_provider: LiveConfigProvider,
    interactive_provider: I,
    networking: NetworkingManager,
    catalog: Arc<dyn CatalogClient>,
    fabric: FabricMetaClient,
    manifest_store: JsonManifestStore,
    workdir: PathBuf,
}

impl CommandSession<LiveDisplayProvider, LiveInteractiveProvider> {
    /// Production composition
    pub fn new(app_config: AppConfig) -> Result<Self> {
        let networking = NetworkingManager::new(app_config.to_networking_config())
            .context("Failed to set up HTTP client")?;
        let live = LiveModrinthClient::with_base_url(networking.http(), app_config.api_url.clone());
        let catalog: Arc<dyn CatalogClient> = Arc::new(CachedCatalog::new(Arc::new(live)));

        Self::assemble(
            LiveDisplayProvider::new(app_config.color_enabled()),
            LiveInteractiveProvider::new(app_config.yes),
            app_config,
            networking,
            catalog,
        )
    }
}

impl<D, I> CommandSession<D, I>
where
    D: DisplayProvider,
    I: InteractiveProvider,
{
    /// Session with custom providers and catalog (for testing)
    ///
    /// The Fabric meta client and HTTP stack still come from `app_config`,
    /// so point `fabric_meta_url` at a mock server.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn new_with_providers(
        display_provider: D,
        interactive_provider: I,
        app_config: AppConfig,
        catalog: Arc<dyn CatalogClient>,
    ) -> Result<Self> {
        let networking = NetworkingManager::new(app_config.to_networking_config())
            .context("Failed to set up HTTP client")?;
        Self::assemble(
            display_provider,
            interactive_provider,
            app_config,
            networking,
            catalog,
        )
    }

    fn assemble(
        display_provider: D,
        interactive_provider: I,
        app_config: AppConfig,
        networking: NetworkingManager,
        catalog: Arc<dyn CatalogClient>,
    ) -> Result<Self> {
        let workdir = match &app_config.workdir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        let fabric =
            FabricMetaClient::with_base_url(networking.http(), app_config.fabric_meta_url.clone());

        Ok(Self {
            display_provider,
            config_provider: LiveConfigProvider::new(app_config),
            interactive_provider,
            networking,
            catalog,
            fabric,
            manifest_store: JsonManifestStore::new(),
            workdir,
        })
    }
}

impl<D, I> Session for CommandSession<D, I>
where
    D: DisplayProvider,
    I: InteractiveProvider,
{
    fn display(&self) -> &dyn DisplayProvider {
        &self.display_provider
    }

    fn config(&self) -> &dyn ConfigProvider {
        &self.config_provider
    }

    fn interactive(&self) -> &dyn InteractiveProvider {
        &self.interactive_provider
    }

    fn catalog(&self) -> &dyn CatalogClient {
        self.catalog.as_ref()
    }

    fn fabric(&self) -> &FabricMetaClient {
        &self.fabric
    }

    fn manifest_store(&self) -> &dyn ManifestStore {
        &self.manifest_store
    }

    fn networking(&self) -> &NetworkingManager {
        &self.networking
    }

    fn workdir(&self) -> &Path {
        &self.workdir
    }
}
