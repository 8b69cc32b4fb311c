// Tests for the Modrinth catalog client

use super::*;
use mockito::{Matcher, Server};

fn live_client(server: &Server) -> LiveModrinthClient {
    let http = Arc::new(RateLimitedClient::new(reqwest::Client::new()));
    LiveModrinthClient::with_base_url(http, format!("{}/v2", server.url()))
}

fn sample_project() -> ProjectSummary {
    ProjectSummary {
        id: "P7dR8mSH".to_string(),
        slug: "fabric-api".to_string(),
        title: "Fabric API".to_string(),
        description: "Lightweight and modular API".to_string(),
        client_side: SideSupport::Required,
        server_side: SideSupport::Required,
    }
}

const VERSION_JSON: &str = r#"[
  {
    "id": "old1",
    "project_id": "P7dR8mSH",
    "name": "Fabric API 0.90",
    "version_number": "0.90.0",
    "version_type": "release",
    "date_published": "2023-11-01T10:00:00.000000Z",
    "game_versions": ["1.20.1"],
    "loaders": ["fabric"],
    "dependencies": [],
    "files": [{"hashes": {"sha512": "aa", "sha1": "bb"}, "url": "https://cdn/old.jar", "filename": "old.jar", "primary": true, "size": 3}],
    "changelog": "Fixed a crash",
    "downloads": 10,
    "featured": false
  },
  {
    "id": "new1",
    "project_id": "P7dR8mSH",
    "name": "Fabric API 0.92",
    "version_number": "0.92.0",
    "version_type": "beta",
    "date_published": "2024-01-01T10:00:00.000000Z",
    "game_versions": ["1.20.1", "1.20.2"],
    "loaders": ["fabric", "neoforge"],
    "dependencies": [{"project_id": "abc", "version_id": null, "dependency_type": "optional"}],
    "files": [
      {"hashes": {"sha512": "cc"}, "url": "https://cdn/sources.jar", "filename": "sources.jar", "primary": false},
      {"hashes": {"sha512": "dd"}, "url": "https://cdn/new.jar", "filename": "new.jar", "primary": true}
    ]
  }
]"#;

// ============================================================================
// Wire types
// ============================================================================

#[test]
fn test_version_record_parses_modrinth_payload() {
    let versions: Vec<VersionRecord> = serde_json::from_str(VERSION_JSON).unwrap();
    let newest = &versions[1];

    assert_eq!(newest.version_type, VersionType::Beta);
    assert_eq!(newest.loaders, vec![ModLoader::Fabric, ModLoader::Unknown]);
    assert_eq!(
        newest.dependencies[0].dependency_type,
        DependencyKind::Optional
    );
    assert_eq!(newest.primary_file().unwrap().filename, "new.jar");
    assert_eq!(newest.changelog, None);
    assert_eq!(versions[0].changelog.as_deref(), Some("Fixed a crash"));
    assert_eq!(versions[0].downloads, 10);
}

#[test]
fn test_published_at_handles_mixed_precision() {
    let mut versions: Vec<VersionRecord> = serde_json::from_str(VERSION_JSON).unwrap();
    let version = &mut versions[0];
    assert!(version.published_at().is_some());

    version.date_published = "2024-01-01T00:00:00Z".to_string();
    let whole = version.published_at().unwrap();
    version.date_published = "2024-01-01T00:00:00.5Z".to_string();
    let fractional = version.published_at().unwrap();
    assert!(fractional > whole);

    version.date_published = String::new();
    assert!(version.published_at().is_none());
}

#[test]
fn test_project_details_parses_project_page() {
    let details: ProjectDetails = serde_json::from_str(
        r#"{
            "id": "AANobbMI", "slug": "sodium", "title": "Sodium",
            "description": "Rendering engine", "body": "Long **markdown**",
            "client_side": "required", "server_side": "unsupported",
            "categories": ["optimization"], "status": "approved",
            "downloads": 1000, "followers": 50,
            "license": {"id": "LGPL-3.0-only", "name": "GNU LGPLv3"},
            "game_versions": ["1.20", "1.20.1"],
            "issues_url": "https://github.com/x/issues", "source_url": null,
            "wiki_url": "", "discord_url": "https://discord.gg/x"
        }"#,
    )
    .unwrap();

    assert_eq!(details.summary.slug, "sodium");
    assert_eq!(details.summary.server_side, SideSupport::Unsupported);
    assert_eq!(details.license.as_ref().unwrap().name, "GNU LGPLv3");
    assert_eq!(details.page_url(), "https://modrinth.com/mod/sodium");
    assert_eq!(
        details.links(),
        vec![
            ("Issues", "https://github.com/x/issues"),
            ("Discord", "https://discord.gg/x")
        ]
    );
}

#[test]
fn test_primary_file_falls_back_to_first() {
    let mut versions: Vec<VersionRecord> = serde_json::from_str(VERSION_JSON).unwrap();
    let version = &mut versions[1];
    for file in &mut version.files {
        file.primary = false;
    }
    assert_eq!(version.primary_file().unwrap().filename, "sources.jar");

    version.files.clear();
    assert!(version.primary_file().is_none());
}

#[test]
fn test_side_support() {
    let project: ProjectSummary = serde_json::from_str(
        r#"{"id": "x", "slug": "x", "title": "X", "client_side": "unsupported", "server_side": "whatever"}"#,
    )
    .unwrap();
    assert!(!project.client_side.is_supported());
    assert_eq!(project.server_side, SideSupport::Unknown);
    assert!(project.server_side.is_supported());
}

#[test]
fn test_server_mod_facets() {
    let facets = server_mod_facets("1.20.1", ModLoader::Fabric);
    assert_eq!(
        facets,
        r#"[["project_type:mod"],["server_side!=unsupported"],["versions:1.20.1"],["categories:fabric"]]"#
    );

    let facets = server_mod_facets("1.20.1", ModLoader::Unknown);
    assert!(!facets.contains("categories"));
}

// ============================================================================
// Live client against mockito
// ============================================================================

#[tokio::test]
async fn test_list_versions_keeps_catalog_order() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/project/P7dR8mSH/version")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("loaders".to_string(), r#"["fabric"]"#.to_string()),
            Matcher::UrlEncoded("game_versions".to_string(), r#"["1.20.1"]"#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(VERSION_JSON)
        .create_async()
        .await;

    let client = live_client(&server);
    let versions = client
        .list_versions("P7dR8mSH", Some("1.20.1"), Some(ModLoader::Fabric))
        .await
        .unwrap();

    // Listed as served, even though the later entry was published later
    assert_eq!(versions[0].id, "old1");
    assert_eq!(versions[1].id, "new1");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_project_maps_404() {
    let mut server = Server::new_async().await;
    let found = server
        .mock("GET", "/v2/project/fabric-api")
        .with_status(200)
        .with_body(serde_json::to_string(&sample_project()).unwrap())
        .expect(1)
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/v2/project/nope")
        .with_status(404)
        .create_async()
        .await;

    let client = live_client(&server);

    let project = client.get_project("fabric-api").await.unwrap();
    assert_eq!(project.id, "P7dR8mSH");

    found.assert_async().await;

    let err = client.get_project("nope").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_server_errors_are_reported() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/project/broken")
        .with_status(500)
        .create_async()
        .await;

    let err = live_client(&server)
        .get_project("broken")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::UnexpectedStatus { status: 500, .. }
    ));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_version_from_hash() {
    let mut server = Server::new_async().await;
    let versions: Vec<VersionRecord> = serde_json::from_str(VERSION_JSON).unwrap();
    let _mock = server
        .mock("GET", "/v2/version_file/dd")
        .match_query(Matcher::UrlEncoded(
            "algorithm".to_string(),
            "sha512".to_string(),
        ))
        .with_status(200)
        .with_body(serde_json::to_string(&versions[1]).unwrap())
        .create_async()
        .await;

    let client = live_client(&server);
    assert_eq!(client.version_from_hash("dd").await.unwrap().id, "new1");
    assert!(matches!(
        client.version_from_hash("ee").await,
        Err(CatalogError::HashNotFound { .. })
    ));
}

#[tokio::test]
async fn test_search_encodes_query_and_facets() {
    let mut server = Server::new_async().await;
    let facets = server_mod_facets("1.20.1", ModLoader::Fabric);
    let mock = server
        .mock("GET", "/v2/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".to_string(), "fabric api".to_string()),
            Matcher::UrlEncoded("facets".to_string(), facets.clone()),
            Matcher::UrlEncoded("index".to_string(), "downloads".to_string()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"hits": [{"slug": "fabric-api", "title": "Fabric API", "project_id": "P7dR8mSH", "server_side": "required", "client_side": "required"}], "offset": 0, "limit": 10, "total_hits": 1}"#,
        )
        .create_async()
        .await;

    let results = live_client(&server)
        .search("fabric api", Some(&facets), SearchSort::Downloads, 10, 0)
        .await
        .unwrap();
    assert_eq!(results.hits[0].slug, "fabric-api");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_search_limit_is_validated() {
    let server = Server::new_async().await;
    let err = live_client(&server)
        .search("x", None, SearchSort::Relevance, 101, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidSearchParams { .. }));
}

#[tokio::test]
async fn test_project_details_fetches_project_page() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/project/fabric-api")
        .with_status(200)
        .with_body(
            r#"{"id": "P7dR8mSH", "slug": "fabric-api", "title": "Fabric API", "body": "Hooks", "followers": 7}"#,
        )
        .create_async()
        .await;

    let details = live_client(&server).project_details("fabric-api").await.unwrap();
    assert_eq!(details.summary.id, "P7dR8mSH");
    assert_eq!(details.body, "Hooks");
    assert_eq!(details.followers, 7);
    assert_eq!(details.summary.server_side, SideSupport::Unknown);
    mock.assert_async().await;
}

// ============================================================================
// Mock client
// ============================================================================

#[tokio::test]
async fn test_mock_catalog_records_calls() {
    let versions: Vec<VersionRecord> = serde_json::from_str(VERSION_JSON).unwrap();
    let mock = MockCatalogClient::new()
        .with_project(sample_project(), versions)
        .with_failure("flaky", "connection reset");

    assert_eq!(mock.get_project("fabric-api").await.unwrap().id, "P7dR8mSH");
    assert_eq!(
        mock.list_versions("P7dR8mSH", None, None).await.unwrap().len(),
        2
    );
    assert_eq!(mock.version_from_hash("aa").await.unwrap().id, "old1");
    assert!(!mock.get_project("flaky").await.unwrap_err().is_not_found());
    assert!(mock.get_project("missing").await.unwrap_err().is_not_found());

    assert_eq!(mock.count_calls("project:fabric-api"), 1);
    assert_eq!(mock.calls().len(), 5);
}

#[tokio::test]
async fn test_mock_project_details_falls_back_to_summary() {
    let mut page = ProjectDetails::from(sample_project());
    page.body = "All the hooks".to_string();
    let mock = MockCatalogClient::new()
        .with_details(page)
        .with_project(
            ProjectSummary {
                id: "id-lithium".to_string(),
                slug: "lithium".to_string(),
                title: "Lithium".to_string(),
                description: String::new(),
                client_side: SideSupport::Optional,
                server_side: SideSupport::Optional,
            },
            Vec::new(),
        );

    assert_eq!(mock.project_details("P7dR8mSH").await.unwrap().body, "All the hooks");
    let lithium = mock.project_details("lithium").await.unwrap();
    assert_eq!(lithium.summary.title, "Lithium");
    assert!(lithium.body.is_empty());
    assert!(mock.project_details("missing").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_mock_remembers_search_order() {
    let mock = MockCatalogClient::new();
    assert_eq!(mock.last_search_sort(), None);
    mock.search("x", None, SearchSort::Updated, 10, 0).await.unwrap();
    assert_eq!(mock.last_search_sort(), Some(SearchSort::Updated));
}
