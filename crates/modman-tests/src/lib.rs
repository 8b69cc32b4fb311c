//! Hermetic workflow tests for modman
//!
//! [`TestServer`] pairs a temporary server directory with a mockito server
//! acting as the Modrinth CDN. Projects published to it are served by an
//! in-memory catalog; every command runs through a fresh mock session, the
//! same way the binary runs one session per invocation.

use anyhow::Result;
use mockito::{Mock, ServerGuard};
use modman_lib::ModLoader;
use modman_lib::api::modrinth::{CatalogClient, MockCatalogClient, ProjectSummary, VersionRecord};
use modman_lib::application::session_mocks::{
    MockCommandSession, MockInteractiveProvider, mock_session,
};
use modman_lib::application::{CommandReport, Commands, execute_command_with_session};
use modman_lib::display::MockDisplayProvider;
use modman_lib::modman::manifest::{JsonManifestStore, ManifestStore, ProjectManifest};
use modman_lib::testing::catalog::GAME_VERSION;
use modman_lib::testing::{ServerDirFixture, VersionBuilder, jar_bytes};
use std::sync::Arc;

pub use modman_lib::testing;

pub struct TestServer {
    pub dir: ServerDirFixture,
    pub display: MockDisplayProvider,
    cdn: ServerGuard,
    projects: Vec<(ProjectSummary, Vec<VersionRecord>)>,
    mocks: Vec<Mock>,
}

impl TestServer {
    /// Empty server directory with a Fabric manifest for the test game version
    pub async fn new() -> Self {
        let server = Self {
            dir: ServerDirFixture::new().expect("temp server dir"),
            display: MockDisplayProvider::new(),
            cdn: mockito::Server::new_async().await,
            projects: Vec::new(),
            mocks: Vec::new(),
        };
        let manifest = ProjectManifest::new("workflow", GAME_VERSION, ModLoader::Fabric, None);
        JsonManifestStore::new()
            .save(&manifest, server.dir.path())
            .expect("seed manifest");
        server
    }

    /// Publish a version of `project` as its newest, served from the mock CDN
    pub async fn publish(
        &mut self,
        project: ProjectSummary,
        builder: VersionBuilder,
    ) -> VersionRecord {
        let record = builder.served_from(&self.cdn.url()).build();
        let path = format!("/{}/{}.jar", project.slug, record.id);
        let mock = self
            .cdn
            .mock("GET", path.as_str())
            .with_status(200)
            .with_body(jar_bytes(&project.slug, &record.id))
            .create_async()
            .await;
        self.mocks.push(mock);

        match self
            .projects
            .iter_mut()
            .find(|(known, _)| known.id == project.id)
        {
            Some((_, versions)) => versions.insert(0, record.clone()),
            None => self.projects.push((project, vec![record.clone()])),
        }
        record
    }

    pub fn catalog(&self) -> MockCatalogClient {
        self.projects
            .iter()
            .fold(MockCatalogClient::new(), |catalog, (project, versions)| {
                catalog.with_project(project.clone(), versions.clone())
            })
    }

    pub fn session(&self) -> Result<MockCommandSession> {
        mock_session(
            self.dir.path(),
            Arc::new(self.catalog()) as Arc<dyn CatalogClient>,
            self.display.clone(),
            MockInteractiveProvider::new(),
        )
    }

    pub async fn run(&self, command: Commands) -> Result<CommandReport> {
        let session = self.session()?;
        execute_command_with_session(command, &session).await
    }

    pub fn manifest(&self) -> ProjectManifest {
        JsonManifestStore::new()
            .load(self.dir.path())
            .expect("manifest loads")
    }
}

fn owned(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

pub fn install(ids: &[&str]) -> Commands {
    Commands::Install {
        mods: owned(ids),
        reinstall: false,
        optional: false,
        dry: false,
    }
}

pub fn install_with_optional(ids: &[&str]) -> Commands {
    Commands::Install {
        mods: owned(ids),
        reinstall: false,
        optional: true,
        dry: false,
    }
}

pub fn reinstall(ids: &[&str]) -> Commands {
    Commands::Install {
        mods: owned(ids),
        reinstall: true,
        optional: false,
        dry: false,
    }
}

pub fn update(ids: &[&str]) -> Commands {
    Commands::Update {
        mods: owned(ids),
        game_version: None,
        prerelease: false,
    }
}

pub fn uninstall(ids: &[&str]) -> Commands {
    Commands::Uninstall { mods: owned(ids) }
}
