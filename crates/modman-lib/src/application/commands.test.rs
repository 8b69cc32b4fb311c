use super::*;
use crate::api::modrinth::{
    CatalogClient, License, MockCatalogClient, ProjectDetails, SearchHit, SearchResults, SideSupport,
};
use crate::application::config::AppConfig;
use crate::application::session_mocks::*;
use crate::display::{DisplayCall, MockDisplayProvider};
use crate::modman::manifest::{JsonManifestStore, ManifestStore};
use crate::testing::catalog::GAME_VERSION;
use crate::testing::*;
use std::io::Write;
use std::sync::Arc;

struct Harness {
    dir: ServerDirFixture,
    display: MockDisplayProvider,
    interactive: MockInteractiveProvider,
    catalog: Arc<MockCatalogClient>,
    session: MockCommandSession,
}

fn harness_with(catalog: MockCatalogClient, interactive: MockInteractiveProvider) -> Harness {
    let dir = ServerDirFixture::new().unwrap();
    let display = MockDisplayProvider::new();
    let catalog = Arc::new(catalog);
    let session = mock_session(
        dir.path(),
        catalog.clone() as Arc<dyn CatalogClient>,
        display.clone(),
        interactive.clone(),
    )
    .unwrap();
    Harness {
        dir,
        display,
        interactive,
        catalog,
        session,
    }
}

fn harness(catalog: MockCatalogClient) -> Harness {
    harness_with(catalog, MockInteractiveProvider::new())
}

fn installed(slug: &str, version_id: &str) -> InstalledMod {
    InstalledMod::from_selection(&project(slug), &version(slug, version_id), None).unwrap()
}

impl Harness {
    fn seed(&self, mods: &[InstalledMod]) {
        let mut manifest = ProjectManifest::new("test", GAME_VERSION, ModLoader::Fabric, None);
        for entry in mods {
            manifest.insert(entry.clone());
        }
        JsonManifestStore::new().save(&manifest, self.dir.path()).unwrap();
    }

    fn manifest(&self) -> ProjectManifest {
        JsonManifestStore::new().load(self.dir.path()).unwrap()
    }

    async fn run(&self, command: Commands) -> Result<CommandReport> {
        execute_command_with_session(command, &self.session).await
    }
}

fn install(mods: &[&str], dry: bool) -> Commands {
    Commands::Install {
        mods: mods.iter().map(|m| m.to_string()).collect(),
        reinstall: false,
        optional: false,
        dry,
    }
}

/// A minimal Fabric launcher jar carrying `install.properties`
fn write_fabric_launcher(dir: &Path, name: &str) {
    let file = std::fs::File::create(dir.join(name)).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file("install.properties", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer
        .write_all(b"fabric-loader-version=0.15.11\ngame-version=1.20.1\n")
        .unwrap();
    writer.finish().unwrap();
}

// ===== INIT =====

mod handle_init_tests {
    use super::*;

    #[tokio::test]
    async fn it_requires_loader_and_version_without_detection() {
        let h = harness(MockCatalogClient::new());
        let result = h
            .run(Commands::Init {
                name: None,
                no_auto: true,
                loader: Some(ModLoader::Fabric),
                game_version: None,
            })
            .await;

        assert!(result.is_err());
        assert!(!JsonManifestStore::new().exists(h.dir.path()));
    }

    #[tokio::test]
    async fn it_writes_explicit_settings() {
        let h = harness(MockCatalogClient::new());
        let report = h
            .run(Commands::Init {
                name: Some("smp".into()),
                no_auto: true,
                loader: Some(ModLoader::Quilt),
                game_version: Some("1.20.4".into()),
            })
            .await
            .unwrap();

        assert!(report.is_success());
        let manifest = h.manifest();
        assert_eq!(manifest.name, "smp");
        assert_eq!(manifest.loader, ModLoader::Quilt);
        assert_eq!(manifest.game_version, "1.20.4");
        assert!(manifest.mods.is_empty());
    }

    #[tokio::test]
    async fn it_detects_the_server_and_adopts_known_jars() {
        let catalog = MockCatalogClient::new().with_project(project("sodium"), vec![version("sodium", "v1")]);
        let h = harness(catalog);
        write_fabric_launcher(h.dir.path(), "fabric-server-launch.jar");
        h.dir.write_mod("renamed.jar", &jar_bytes("sodium", "v1")).unwrap();
        h.dir.write_mod("homemade.jar", b"not on modrinth").unwrap();

        let report = h
            .run(Commands::Init {
                name: None,
                no_auto: false,
                loader: None,
                game_version: None,
            })
            .await
            .unwrap();

        assert!(report.is_success());
        let manifest = h.manifest();
        assert_eq!(manifest.loader, ModLoader::Fabric);
        assert_eq!(manifest.game_version, "1.20.1");
        assert_eq!(manifest.loader_version.as_deref(), Some("0.15.11"));
        assert_eq!(
            manifest.server_jar.as_deref(),
            Some(Path::new("fabric-server-launch.jar"))
        );
        assert!(manifest.contains("sodium"));
        assert_eq!(h.dir.mod_files(), vec!["homemade.jar", "sodium-v1.jar"]);
        assert_eq!(h.display.count_calls("status_warning"), 1);
    }

    #[tokio::test]
    async fn it_refuses_to_overwrite_a_manifest() {
        let h = harness(MockCatalogClient::new());
        h.seed(&[]);

        let result = h
            .run(Commands::Init {
                name: None,
                no_auto: true,
                loader: Some(ModLoader::Fabric),
                game_version: Some(GAME_VERSION.into()),
            })
            .await;
        assert!(result.is_err());
    }
}

// ===== INSTALL =====

mod handle_install_tests {
    use super::*;

    #[tokio::test]
    async fn it_fails_without_a_manifest() {
        let h = harness(MockCatalogClient::new());
        assert!(h.run(install(&["sodium"], false)).await.is_err());
    }

    #[tokio::test]
    async fn it_aborts_on_a_corrupt_manifest() {
        let h = harness(MockCatalogClient::new().with_project(project("sodium"), vec![version("sodium", "v1")]));
        std::fs::write(JsonManifestStore::manifest_path(h.dir.path()), "{ not json").unwrap();

        assert!(h.run(install(&["sodium"], false)).await.is_err());
        assert_eq!(h.catalog.calls().len(), 0);
        assert!(h.dir.mod_files().is_empty());
    }

    #[tokio::test]
    async fn dry_run_prints_the_plan_only() {
        let h = harness(MockCatalogClient::new().with_project(
            project("sodium"),
            vec![VersionBuilder::new("sodium", "v1").requires("indium").build()],
        )
        .with_project(project("indium"), vec![version("indium", "v1")]));
        h.seed(&[]);

        let report = h.run(install(&["sodium"], true)).await.unwrap();

        assert!(report.is_success());
        assert!(h.display.has_call(&DisplayCall::StatusList {
            items: vec!["add sodium v1".into(), "add indium v1".into()],
        }));
        assert!(h.manifest().mods.is_empty());
        assert!(h.dir.mod_files().is_empty());
    }

    #[tokio::test]
    async fn it_downloads_and_records_new_mods() {
        let mut server = mockito::Server::new_async().await;
        let body = jar_bytes("lithium", "v1");
        let mock = server
            .mock("GET", "/lithium/v1.jar")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;
        let catalog = MockCatalogClient::new().with_project(
            project("lithium"),
            vec![VersionBuilder::new("lithium", "v1").served_from(&server.url()).build()],
        );
        let h = harness(catalog);
        h.seed(&[]);

        let report = h.run(install(&["lithium"], false)).await.unwrap();

        mock.assert_async().await;
        assert!(report.is_success());
        assert!(h.dir.has_mod("lithium-v1.jar"));
        assert_eq!(h.manifest().find("lithium").unwrap().version_id, "v1");
        assert!(h.display.has_call(&DisplayCall::StatusComplete {
            task: "install completed".into()
        }));
    }

    #[tokio::test]
    async fn unknown_names_fall_back_to_search() {
        let hit = SearchHit {
            slug: "sodium".into(),
            title: "Sodium".into(),
            description: String::new(),
            project_id: project_id("sodium"),
            downloads: 100,
            author: "jellysquid".into(),
            client_side: SideSupport::Required,
            server_side: SideSupport::Optional,
        };
        let catalog = MockCatalogClient::new()
            .with_project(project("sodium"), vec![version("sodium", "v1")])
            .with_search_result(
                "Sodium Renderer",
                SearchResults {
                    hits: vec![hit],
                    offset: 0,
                    limit: 10,
                    total_hits: 1,
                },
            );
        let h = harness(catalog);
        h.seed(&[]);

        let report = h.run(install(&["Sodium Renderer"], true)).await.unwrap();

        assert!(report.is_success());
        assert_eq!(h.catalog.count_calls("search:Sodium Renderer"), 1);
        assert_eq!(h.interactive.prompts().len(), 1);
        assert!(h.display.transcript().contains("add sodium v1"));
    }

    #[tokio::test]
    async fn cancelled_selection_is_reported() {
        let hit = SearchHit {
            slug: "sodium".into(),
            title: "Sodium".into(),
            description: String::new(),
            project_id: project_id("sodium"),
            downloads: 1,
            author: String::new(),
            client_side: SideSupport::Required,
            server_side: SideSupport::Optional,
        };
        let catalog = MockCatalogClient::new().with_search_result(
            "fast",
            SearchResults {
                hits: vec![hit],
                offset: 0,
                limit: 10,
                total_hits: 1,
            },
        );
        let h = harness_with(catalog, MockInteractiveProvider::new().with_selection(None));
        h.seed(&[]);

        let report = h.run(install(&["fast", "nothing-matches"], false)).await.unwrap();

        assert_eq!(report.failures.len(), 2);
        assert!(report
            .failures
            .iter()
            .all(|f| f.message == "no matching mod found"));
        assert!(h.display.has_call(&DisplayCall::StatusSection {
            title: "Failures".into()
        }));
    }

    #[tokio::test]
    async fn resolution_errors_do_not_block_other_mods() {
        let catalog = MockCatalogClient::new()
            .with_project(project("good"), vec![version("good", "v1")])
            .with_project(
                project("old"),
                vec![VersionBuilder::new("old", "v1").game_versions(&["1.16.5"]).build()],
            );
        let h = harness(catalog);
        h.seed(&[]);

        let report = h.run(install(&["old", "good"], true)).await.unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].identifier, "old");
        assert!(h.display.transcript().contains("add good v1"));
    }
}

// ===== UNINSTALL / UPDATE =====

mod handle_uninstall_tests {
    use super::*;

    #[tokio::test]
    async fn it_removes_files_and_entries() {
        let h = harness(MockCatalogClient::new());
        let sodium = installed("sodium", "v1");
        h.dir.materialize(&sodium, &jar_bytes("sodium", "v1")).unwrap();
        h.seed(&[sodium, installed("lithium", "v1")]);

        let report = h
            .run(Commands::Uninstall {
                mods: vec!["sodium".into(), "ghost".into()],
            })
            .await
            .unwrap();

        assert_eq!(report.failures, vec![ModFailure::new("ghost", "not installed")]);
        let manifest = h.manifest();
        assert!(!manifest.contains("sodium"));
        assert!(manifest.contains("lithium"));
        assert!(!h.dir.has_mod("sodium-v1.jar"));
    }

    #[tokio::test]
    async fn it_accepts_titles_and_paths_to_jars() {
        let h = harness(MockCatalogClient::new());
        let sodium = installed("sodium", "v1");
        let api = installed("fabric-api", "v1");
        h.dir.materialize(&sodium, &jar_bytes("sodium", "v1")).unwrap();
        h.dir.materialize(&api, &jar_bytes("fabric-api", "v1")).unwrap();
        h.seed(&[sodium, api, installed("lithium", "v1")]);

        let report = h
            .run(Commands::Uninstall {
                mods: vec!["Fabric API".into(), "mods/sodium-v1.jar".into()],
            })
            .await
            .unwrap();

        assert!(report.is_success());
        let manifest = h.manifest();
        assert_eq!(manifest.mods.keys().collect::<Vec<_>>(), vec!["lithium"]);
        assert!(h.dir.mod_files().is_empty());
    }

    #[test]
    fn only_existing_paths_are_reduced_to_file_names() {
        let dir = ServerDirFixture::new().unwrap();
        dir.write_mod("sodium-v1.jar", b"jar").unwrap();
        let absolute = dir.mods_dir().join("sodium-v1.jar");

        assert_eq!(uninstall_name(dir.path(), "mods/sodium-v1.jar"), "sodium-v1.jar");
        assert_eq!(
            uninstall_name(Path::new("/elsewhere"), &absolute.to_string_lossy()),
            "sodium-v1.jar"
        );
        assert_eq!(uninstall_name(dir.path(), "mods/ghost.jar"), "mods/ghost.jar");
        assert_eq!(uninstall_name(dir.path(), "Fabric API"), "Fabric API");
    }
}

mod handle_update_tests {
    use super::*;

    #[tokio::test]
    async fn it_reports_mods_that_are_not_installed() {
        let h = harness(MockCatalogClient::new());
        h.seed(&[]);

        let report = h
            .run(Commands::Update {
                mods: vec!["sodium".into()],
                game_version: None,
                prerelease: false,
            })
            .await
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].identifier, "sodium");
    }

    #[tokio::test]
    async fn it_bumps_the_game_version_even_when_nothing_changes() {
        let h = harness(MockCatalogClient::new());
        h.seed(&[]);

        let report = h
            .run(Commands::Update {
                mods: vec![],
                game_version: Some("1.21".into()),
                prerelease: false,
            })
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(h.manifest().game_version, "1.21");
    }
}

// ===== LIST / PACK / SEARCH =====

mod handle_list_tests {
    use super::*;

    #[tokio::test]
    async fn it_shows_file_states() {
        let h = harness(MockCatalogClient::new());
        let ok = installed("alpha", "v1");
        let corrupt = installed("beta", "v1");
        let missing = installed("gamma", "v1");
        h.dir.materialize(&ok, &jar_bytes("alpha", "v1")).unwrap();
        h.dir.materialize(&corrupt, b"garbage").unwrap();
        h.seed(&[ok, corrupt, missing]);

        let report = h.run(Commands::List).await.unwrap();

        assert!(report.is_success());
        let transcript = h.display.transcript();
        assert!(transcript.contains("alpha alpha v1 alpha-v1.jar ok"));
        assert!(transcript.contains("beta beta v1 beta-v1.jar corrupt"));
        assert!(transcript.contains("gamma gamma v1 gamma-v1.jar missing"));
        assert!(transcript.contains("Run 'modman install' to repair beta, gamma"));
    }

    #[test]
    fn stale_entries_are_labelled() {
        let entry = installed("alpha", "v1");
        assert_eq!(state_label(&entry, Some(&FileState::Valid), "1.21"), "stale");
        assert_eq!(state_label(&entry, Some(&FileState::Valid), GAME_VERSION), "ok");
        assert_eq!(state_label(&entry, None, GAME_VERSION), "missing");
    }
}

mod handle_pack_tests {
    use super::*;

    #[tokio::test]
    async fn it_writes_the_client_archive() {
        let h = harness(MockCatalogClient::new());
        let client = installed("alpha", "v1");
        let server_only = InstalledMod::from_selection(
            &server_only_project("backup"),
            &version("backup", "v1"),
            None,
        )
        .unwrap();
        h.dir.materialize(&client, &jar_bytes("alpha", "v1")).unwrap();
        h.dir.materialize(&server_only, &jar_bytes("backup", "v1")).unwrap();
        h.seed(&[client, server_only]);

        h.run(Commands::Pack {
            include_server_side: false,
        }).await.unwrap();

        let archive = std::fs::File::open(h.dir.path().join("test.zip")).unwrap();
        let archive = zip::ZipArchive::new(archive).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(names, vec!["alpha-v1.jar"]);
    }

    #[tokio::test]
    async fn it_fails_on_missing_files() {
        let h = harness(MockCatalogClient::new());
        h.seed(&[installed("alpha", "v1")]);

        assert!(h.run(Commands::Pack {
            include_server_side: true,
        }).await.is_err());
        assert!(!h.dir.path().join("test.zip").exists());
    }
}

mod handle_search_tests {
    use super::*;

    #[tokio::test]
    async fn it_marks_installed_mods() {
        let hits = ["sodium", "lithium"]
            .iter()
            .map(|slug| SearchHit {
                slug: slug.to_string(),
                title: slug.to_string(),
                description: "fast".into(),
                project_id: project_id(slug),
                downloads: 5,
                author: String::new(),
                client_side: SideSupport::Optional,
                server_side: SideSupport::Required,
            })
            .collect();
        let catalog = MockCatalogClient::new().with_search_result(
            "perf",
            SearchResults {
                hits,
                offset: 0,
                limit: 10,
                total_hits: 2,
            },
        );
        let h = harness(catalog);
        h.seed(&[installed("lithium", "v1")]);

        h.run(Commands::Search {
            query: "perf".into(),
            limit: 10,
            page: 1,
            sort_by: SearchSort::Downloads,
        })
        .await
        .unwrap();

        let transcript = h.display.transcript();
        assert!(transcript.contains(" sodium sodium 5 fast"));
        assert!(transcript.contains("yes lithium lithium 5 fast"));
        assert!(transcript.contains("Page 1 of 1"));
        assert_eq!(h.catalog.last_search_sort(), Some(SearchSort::Downloads));
    }

    #[tokio::test]
    async fn it_rejects_page_zero() {
        let h = harness(MockCatalogClient::new());
        let result = h
            .run(Commands::Search {
                query: "x".into(),
                limit: 10,
                page: 0,
                sort_by: SearchSort::Relevance,
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn it_rejects_limits_above_one_hundred() {
        let h = harness(MockCatalogClient::new());
        let result = h
            .run(Commands::Search {
                query: "x".into(),
                limit: 101,
                page: 1,
                sort_by: SearchSort::Relevance,
            })
            .await;

        assert!(result.unwrap_err().to_string().contains("at most 100"));
        assert!(h.catalog.calls().is_empty());
    }
}

// ===== VIEW / CHANGELOG =====

mod handle_view_tests {
    use super::*;

    fn sodium_page() -> ProjectDetails {
        let mut page = ProjectDetails::from(project("sodium"));
        page.summary.title = "Sodium".into();
        page.summary.description = "Rendering engine".into();
        page.body = "Long description".into();
        page.categories = vec!["optimization".into()];
        page.status = "approved".into();
        page.downloads = 1200;
        page.license = Some(License {
            id: "LGPL-3.0-only".into(),
            name: String::new(),
        });
        page.game_versions = vec!["1.20".into(), "1.20.1".into()];
        page.source_url = Some("https://github.com/x/sodium".into());
        page
    }

    #[tokio::test]
    async fn it_shows_the_project_page() {
        let h = harness(MockCatalogClient::new().with_details(sodium_page()));
        h.seed(&[installed("sodium", "v1")]);

        let report = h
            .run(Commands::View {
                project: "sodium".into(),
            })
            .await
            .unwrap();

        assert!(report.is_success());
        let transcript = h.display.transcript();
        assert!(transcript.contains("Rendering engine"));
        assert!(transcript.contains("Categories: optimization"));
        assert!(transcript.contains("License: LGPL-3.0-only"));
        assert!(transcript.contains("Game versions: 1.20.1, 1.20"));
        assert!(transcript.contains("Installed: v1"));
        assert!(transcript.contains("Modrinth: https://modrinth.com/mod/sodium"));
        assert!(transcript.contains("Source: https://github.com/x/sodium"));
        assert!(transcript.contains("Long description"));
        assert_eq!(h.catalog.count_calls("details:sodium"), 1);
    }

    #[tokio::test]
    async fn it_works_outside_a_server_directory() {
        let h = harness(MockCatalogClient::new().with_project(project("lithium"), vec![]));

        h.run(Commands::View {
            project: "lithium".into(),
        })
        .await
        .unwrap();

        let transcript = h.display.transcript();
        assert!(transcript.contains("Slug: lithium"));
        assert!(!transcript.contains("Installed"));
        assert!(!transcript.contains("Description"));
    }

    #[tokio::test]
    async fn it_fails_for_unknown_projects() {
        let h = harness(MockCatalogClient::new());
        assert!(
            h.run(Commands::View {
                project: "ghost".into()
            })
            .await
            .is_err()
        );
    }
}

mod handle_changelog_tests {
    use super::*;

    fn changelog(project: &str, version: Option<&str>, sort_by: ChangelogSort, limit: usize) -> Commands {
        Commands::Changelog {
            project: project.into(),
            version: version.map(str::to_string),
            verbose: false,
            sort_by,
            direction: SortDirection::Desc,
            limit,
        }
    }

    fn releases() -> Vec<VersionRecord> {
        vec![
            VersionBuilder::new("sodium", "c3")
                .version_number("0.5.3")
                .published("2024-03-01T00:00:00Z")
                .changelog("Third")
                .downloads(5)
                .build(),
            VersionBuilder::new("sodium", "c2b")
                .version_number("0.5.2")
                .published("2024-02-02T00:00:00Z")
                .changelog("Second, other loader build")
                .downloads(50)
                .build(),
            VersionBuilder::new("sodium", "c2")
                .version_number("0.5.2")
                .published("2024-02-01T00:00:00Z")
                .changelog("Second")
                .downloads(40)
                .build(),
            VersionBuilder::new("sodium", "c1")
                .version_number("0.5.10")
                .published("2024-01-01T00:00:00.5Z")
                .downloads(1)
                .build(),
        ]
    }

    fn sections(h: &Harness) -> Vec<String> {
        h.display
            .get_calls()
            .into_iter()
            .filter_map(|call| match call {
                DisplayCall::StatusSection { title } => Some(title),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn it_lists_newest_first_without_repeated_numbers() {
        let h = harness(MockCatalogClient::new().with_project(project("sodium"), releases()));

        h.run(changelog("sodium", None, ChangelogSort::Date, 10)).await.unwrap();

        assert_eq!(sections(&h), vec!["c3 - 0.5.3", "c2b - 0.5.2", "c1 - 0.5.10"]);
        assert!(h.display.transcript().contains("No changelog for this version."));
    }

    #[tokio::test]
    async fn it_sorts_by_downloads_and_version_number() {
        let h = harness(MockCatalogClient::new().with_project(project("sodium"), releases()));

        h.run(changelog("sodium", None, ChangelogSort::Downloads, 2)).await.unwrap();
        assert_eq!(sections(&h), vec!["c2b - 0.5.2", "c3 - 0.5.3"]);

        h.display.clear_calls();
        h.run(changelog("sodium", None, ChangelogSort::VersionNumber, 1)).await.unwrap();
        assert_eq!(sections(&h), vec!["c1 - 0.5.10"]);
    }

    #[tokio::test]
    async fn it_picks_named_versions() {
        let h = harness(MockCatalogClient::new().with_project(project("sodium"), releases()));

        h.run(changelog("sodium", Some("latest"), ChangelogSort::Date, 10)).await.unwrap();
        h.run(changelog("sodium", Some("oldest"), ChangelogSort::Date, 10)).await.unwrap();
        h.run(changelog("sodium", Some("0.5.2"), ChangelogSort::Date, 10)).await.unwrap();

        assert_eq!(sections(&h), vec!["c3 - 0.5.3", "c1 - 0.5.10", "c2b - 0.5.2"]);
        assert!(h.run(changelog("sodium", Some("9.9"), ChangelogSort::Date, 10)).await.is_err());
    }

    #[tokio::test]
    async fn verbose_output_shows_downloads() {
        let h = harness(MockCatalogClient::new().with_project(project("sodium"), releases()));
        let command = Commands::Changelog {
            project: "sodium".into(),
            version: Some("c2".into()),
            verbose: true,
            sort_by: ChangelogSort::Date,
            direction: SortDirection::Asc,
            limit: 10,
        };

        h.run(command).await.unwrap();

        let transcript = h.display.transcript();
        assert!(transcript.contains("ago | Downloads: 40"));
        assert!(transcript.contains("Second"));
    }

    #[test]
    fn ascending_order_starts_from_the_oldest() {
        let versions = releases();
        let order = ChangelogOrder {
            sort_by: ChangelogSort::Date,
            direction: SortDirection::Asc,
            limit: 2,
        };
        let ids: Vec<&str> = changelog_listing(&versions, order)
            .iter()
            .map(|v| v.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }

    #[test]
    fn release_age_is_coarse() {
        let now = DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc);

        assert_eq!(released_ago(at("2024-06-01T09:00:00Z"), now), "3 hours ago");
        assert_eq!(released_ago(at("2024-05-29T12:00:00Z"), now), "3 days ago");
        assert_eq!(released_ago(at("2024-05-11T12:00:00Z"), now), "3 weeks ago");
        assert_eq!(released_ago(at("2024-03-01T12:00:00Z"), now), "3 months ago");
        assert_eq!(released_ago(at("2022-06-01T12:00:00Z"), now), "2 years ago");
    }
}

// ===== DOWNLOAD-FABRIC =====

mod handle_download_fabric_tests {
    use super::*;

    #[tokio::test]
    async fn it_downloads_the_launcher_and_updates_the_manifest() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/versions/game/intermediary")
            .with_body(r#"[{"version":"1.20.4","stable":true},{"version":"1.20.1","stable":true}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/versions/loader/1.20.4")
            .with_body(
                r#"[{"loader":{"version":"0.15.11","stable":true}},{"loader":{"version":"0.16.0-beta.1","stable":false}}]"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/versions/installer")
            .with_body(r#"[{"version":"1.0.1","stable":true}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/versions/loader/1.20.4/0.15.11/1.0.1/server/jar")
            .with_body("launcher bytes")
            .create_async()
            .await;

        let dir = ServerDirFixture::new().unwrap();
        let display = MockDisplayProvider::new();
        let config = AppConfig {
            fabric_meta_url: server.url(),
            ..test_config(dir.path())
        };
        let session = CommandSession::new_with_providers(
            display.clone(),
            MockInteractiveProvider::new(),
            config,
            Arc::new(MockCatalogClient::new()),
        )
        .unwrap();
        let mut manifest = ProjectManifest::new("test", GAME_VERSION, ModLoader::Forge, None);
        manifest.insert(installed("alpha", "v1"));
        JsonManifestStore::new().save(&manifest, dir.path()).unwrap();

        execute_command_with_session(
            Commands::DownloadFabric {
                mc_version: "latest".into(),
                loader: None,
                installer: None,
            },
            &session,
        )
        .await
        .unwrap();

        let jar = dir
            .path()
            .join("fabric-server-mc.1.20.4-loader.0.15.11-launcher.1.0.1.jar");
        assert_eq!(std::fs::read_to_string(jar).unwrap(), "launcher bytes");

        let manifest = JsonManifestStore::new().load(dir.path()).unwrap();
        assert_eq!(manifest.loader, ModLoader::Fabric);
        assert_eq!(manifest.game_version, "1.20.4");
        assert_eq!(manifest.loader_version.as_deref(), Some("0.15.11"));
        assert!(manifest.contains("alpha"));
    }
}
