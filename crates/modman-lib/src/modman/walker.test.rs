use super::*;
use crate::api::modrinth::MockCatalogClient;
use crate::primitives::ModLoader;
use crate::testing::{VersionBuilder, project, version};

fn empty_manifest() -> ProjectManifest {
    ProjectManifest::new("test", "1.20.1", ModLoader::Fabric, None)
}

fn installed(slug: &str, version_id: &str) -> InstalledMod {
    InstalledMod::from_selection(&project(slug), &version(slug, version_id), None).unwrap()
}

fn slugs(resolution: &Resolution) -> Vec<&str> {
    let mut slugs: Vec<&str> = resolution
        .to_install
        .iter()
        .map(|m| m.slug.as_str())
        .collect();
    slugs.sort();
    slugs
}

async fn walk(
    request: &WalkRequest,
    manifest: &ProjectManifest,
    catalog: &MockCatalogClient,
) -> Resolution {
    let integrity = IntegrityReport::assume_valid(manifest);
    resolve(request, manifest, &integrity, catalog).await
}

fn roots(ids: &[&str]) -> Vec<RootRequest> {
    ids.iter().map(|id| RootRequest::parse(id)).collect()
}

// ===== RootRequest =====

#[test]
fn test_root_request_parse() {
    assert_eq!(RootRequest::parse("sodium"), RootRequest::new("sodium"));
    assert_eq!(
        RootRequest::parse("sodium==0.5.3"),
        RootRequest {
            identifier: "sodium".into(),
            pinned: Some("0.5.3".into())
        }
    );
    assert_eq!(RootRequest::parse("sodium=="), RootRequest::new("sodium"));
}

// ===== Basic expansion =====

#[tokio::test]
async fn test_single_mod_without_dependencies() {
    let catalog = MockCatalogClient::new().with_project(project("fabric-api"), vec![version("fabric-api", "v1")]);
    let request = WalkRequest::install(roots(&["fabric-api"]), false);

    let resolution = walk(&request, &empty_manifest(), &catalog).await;

    assert!(resolution.is_clean());
    assert_eq!(slugs(&resolution), vec!["fabric-api"]);
    assert_eq!(resolution.to_install[0].dependency_of, None);
}

#[tokio::test]
async fn test_required_followed_optional_skipped() {
    let catalog = MockCatalogClient::new()
        .with_project(
            project("x"),
            vec![VersionBuilder::new("x", "x1").requires("y").optional("z").build()],
        )
        .with_project(project("y"), vec![version("y", "y1")])
        .with_project(project("z"), vec![version("z", "z1")]);

    let without = walk(&WalkRequest::install(roots(&["x"]), false), &empty_manifest(), &catalog).await;
    assert_eq!(slugs(&without), vec!["x", "y"]);
    assert_eq!(catalog.count_calls("project:id-z"), 0);

    let with = walk(&WalkRequest::install(roots(&["x"]), true), &empty_manifest(), &catalog).await;
    assert_eq!(slugs(&with), vec!["x", "y", "z"]);
}

#[tokio::test]
async fn test_dependency_of_points_at_first_parent() {
    let catalog = MockCatalogClient::new()
        .with_project(project("x"), vec![VersionBuilder::new("x", "x1").requires("y").build()])
        .with_project(project("y"), vec![VersionBuilder::new("y", "y1").requires("core").build()])
        .with_project(project("core"), vec![version("core", "c1")]);

    let resolution = walk(&WalkRequest::install(roots(&["x"]), false), &empty_manifest(), &catalog).await;
    let find = |slug: &str| resolution.to_install.iter().find(|m| m.slug == slug).unwrap();

    assert_eq!(find("y").dependency_of.as_deref(), Some("x"));
    assert_eq!(find("core").dependency_of.as_deref(), Some("y"));
}

#[tokio::test]
async fn test_embedded_and_anonymous_dependencies_are_ignored() {
    let mut record = VersionBuilder::new("x", "x1").embeds("shaded").build();
    record.dependencies.push(crate::api::modrinth::DependencyRef {
        version_id: Some("abc".into()),
        project_id: None,
        file_name: None,
        dependency_type: DependencyKind::Required,
    });
    let catalog = MockCatalogClient::new().with_project(project("x"), vec![record]);

    let resolution = walk(&WalkRequest::install(roots(&["x"]), false), &empty_manifest(), &catalog).await;
    assert!(resolution.is_clean());
    assert_eq!(slugs(&resolution), vec!["x"]);
}

// ===== Cycles and duplicates =====

#[tokio::test]
async fn test_cycle_terminates_and_visits_once() {
    let catalog = MockCatalogClient::new()
        .with_project(project("a"), vec![VersionBuilder::new("a", "a1").requires("b").build()])
        .with_project(project("b"), vec![VersionBuilder::new("b", "b1").requires("a").build()]);

    let resolution = walk(&WalkRequest::install(roots(&["a"]), false), &empty_manifest(), &catalog).await;

    assert_eq!(slugs(&resolution), vec!["a", "b"]);
    assert_eq!(catalog.count_calls("project:a"), 1);
    assert_eq!(catalog.count_calls("project:id-a"), 0);
    assert_eq!(catalog.count_calls("project:id-b"), 1);
    assert!(!resolution.graph.cycles().is_empty());
}

#[tokio::test]
async fn test_self_dependency_terminates() {
    let catalog = MockCatalogClient::new()
        .with_project(project("a"), vec![VersionBuilder::new("a", "a1").requires("a").build()]);

    let resolution = walk(&WalkRequest::install(roots(&["a"]), false), &empty_manifest(), &catalog).await;
    assert_eq!(slugs(&resolution), vec!["a"]);
}

#[tokio::test]
async fn test_shared_dependency_resolved_once() {
    let catalog = MockCatalogClient::new()
        .with_project(project("x"), vec![VersionBuilder::new("x", "x1").requires("lib").build()])
        .with_project(project("y"), vec![VersionBuilder::new("y", "y1").requires("lib").build()])
        .with_project(project("lib"), vec![version("lib", "l1")]);

    let resolution = walk(&WalkRequest::install(roots(&["x", "y", "lib"]), false), &empty_manifest(), &catalog).await;

    assert_eq!(slugs(&resolution), vec!["lib", "x", "y"]);
    assert_eq!(catalog.count_calls("versions:id-lib"), 1);
}

#[tokio::test]
async fn test_required_wins_over_optional() {
    let catalog = MockCatalogClient::new()
        .with_project(project("x"), vec![VersionBuilder::new("x", "x1").optional("z").build()])
        .with_project(project("y"), vec![VersionBuilder::new("y", "y1").requires("z").build()])
        .with_project(project("z"), vec![version("z", "z1")]);

    let resolution = walk(&WalkRequest::install(roots(&["x", "y"]), true), &empty_manifest(), &catalog).await;

    assert_eq!(resolution.graph.node("z").map(|n| n.requiredness), Some(Requiredness::Required));
    assert_eq!(
        resolution.to_install.iter().filter(|m| m.slug == "z").count(),
        1
    );
}

// ===== Manifest interaction =====

#[tokio::test]
async fn test_installed_healthy_mod_is_not_re_resolved() {
    let catalog = MockCatalogClient::new().with_project(project("x"), vec![version("x", "x2")]);
    let mut manifest = empty_manifest();
    manifest.insert(installed("x", "x1"));

    let resolution = walk(&WalkRequest::install(roots(&["x"]), false), &manifest, &catalog).await;

    assert!(resolution.is_clean());
    assert_eq!(resolution.to_install[0].version_id, "x1");
    assert!(catalog.calls().is_empty());
}

#[tokio::test]
async fn test_forced_mod_reuses_installed_version_and_expands() {
    let catalog = MockCatalogClient::new().with_project(project("y"), vec![version("y", "y1")]);
    let mut manifest = empty_manifest();
    let mut x = InstalledMod::from_selection(
        &project("x"),
        &VersionBuilder::new("x", "x1").requires("y").build(),
        None,
    )
    .unwrap();
    x.dependency_of = Some("parent".into());
    manifest.insert(x);

    let request = WalkRequest::install(roots(&["x"]), false).with_force(["x".to_string()]);
    let resolution = walk(&request, &manifest, &catalog).await;

    assert_eq!(slugs(&resolution), vec!["x", "y"]);
    let x = resolution.to_install.iter().find(|m| m.slug == "x").unwrap();
    assert_eq!(x.version_id, "x1");
    assert_eq!(x.dependency_of.as_deref(), Some("parent"));
    assert_eq!(catalog.count_calls("project:x"), 0);
}

#[tokio::test]
async fn test_broken_mod_is_expanded_without_force() {
    let catalog = MockCatalogClient::new().with_project(project("y"), vec![version("y", "y1")]);
    let mut manifest = empty_manifest();
    manifest.insert(
        InstalledMod::from_selection(
            &project("x"),
            &VersionBuilder::new("x", "x1").requires("y").build(),
            None,
        )
        .unwrap(),
    );
    let mut integrity = IntegrityReport::assume_valid(&manifest);
    integrity.set("x", crate::modman::integrity::FileState::Missing);

    let resolution = resolve(&WalkRequest::install(roots(&["x"]), false), &manifest, &integrity, &catalog).await;
    assert_eq!(slugs(&resolution), vec!["x", "y"]);
}

// ===== Failures =====

#[tokio::test]
async fn test_failures_are_collected_and_walk_continues() {
    let catalog = MockCatalogClient::new()
        .with_project(
            project("old"),
            vec![VersionBuilder::new("old", "o1").game_versions(&["1.16.5"]).build()],
        )
        .with_project(project("empty"), vec![VersionBuilder::new("empty", "e1").no_files().build()])
        .with_project(project("good"), vec![version("good", "g1")])
        .with_failure("flaky", "connection reset");

    let resolution = walk(
        &WalkRequest::install(roots(&["old", "missing", "flaky", "empty", "good"]), false),
        &empty_manifest(),
        &catalog,
    )
    .await;

    assert_eq!(slugs(&resolution), vec!["good"]);
    let reasons: Vec<(&str, &ResolutionFailure)> = resolution
        .errors
        .iter()
        .map(|e| (e.identifier.as_str(), &e.reason))
        .collect();
    assert_eq!(reasons.len(), 4);
    assert!(matches!(
        reasons[0],
        ("old", ResolutionFailure::NoCompatibleVersion { .. })
    ));
    assert!(matches!(reasons[1], ("missing", ResolutionFailure::Catalog(_))));
    assert!(matches!(reasons[2], ("flaky", ResolutionFailure::Catalog(_))));
    assert!(matches!(reasons[3], ("empty", ResolutionFailure::NoFiles { .. })));
}

#[tokio::test]
async fn test_pinned_version() {
    let catalog = MockCatalogClient::new().with_project(
        project("x"),
        vec![
            VersionBuilder::new("x", "x2").version_number("2.0").build(),
            VersionBuilder::new("x", "x1").version_number("1.0").build(),
        ],
    );

    let pinned = walk(&WalkRequest::install(roots(&["x==1.0"]), false), &empty_manifest(), &catalog).await;
    assert_eq!(pinned.to_install[0].version_id, "x1");

    let bad = walk(&WalkRequest::install(roots(&["x==9.9"]), false), &empty_manifest(), &catalog).await;
    assert!(matches!(
        bad.errors[0].reason,
        ResolutionFailure::PinnedVersionUnavailable { .. }
    ));
}

// ===== Conflicts =====

#[tokio::test]
async fn test_incompatible_with_installed_mod_skips_root() {
    let catalog = MockCatalogClient::new()
        .with_project(
            project("x"),
            vec![VersionBuilder::new("x", "x1").requires("y").incompatible("optifine").build()],
        )
        .with_project(project("y"), vec![version("y", "y1")])
        .with_project(project("other"), vec![version("other", "o1")]);
    let mut manifest = empty_manifest();
    manifest.insert(installed("optifine", "of1"));

    let resolution = walk(&WalkRequest::install(roots(&["x", "other"]), false), &manifest, &catalog).await;

    assert_eq!(slugs(&resolution), vec!["other"]);
    assert!(resolution.errors.iter().any(|e| e.identifier == "x" && e.is_conflict()));
    assert!(resolution.errors.iter().any(|e| e.identifier == "y"
        && matches!(e.reason, ResolutionFailure::SkippedByConflict { .. })));
}

#[tokio::test]
async fn test_dependency_shared_with_a_clean_root_survives_a_conflict() {
    let catalog = MockCatalogClient::new()
        .with_project(
            project("x"),
            vec![VersionBuilder::new("x", "x1").requires("shared").incompatible("optifine").build()],
        )
        .with_project(project("other"), vec![VersionBuilder::new("other", "o1").requires("shared").build()])
        .with_project(project("shared"), vec![version("shared", "s1")]);
    let mut manifest = empty_manifest();
    manifest.insert(installed("optifine", "of1"));

    let resolution = walk(&WalkRequest::install(roots(&["x", "other"]), false), &manifest, &catalog).await;

    assert_eq!(slugs(&resolution), vec!["other", "shared"]);
    assert!(resolution.errors.iter().any(|e| e.identifier == "x" && e.is_conflict()));
    assert!(!resolution.errors.iter().any(|e| e.identifier == "shared"));
}

#[tokio::test]
async fn test_incompatible_reference_to_absent_mod_is_harmless() {
    let catalog = MockCatalogClient::new().with_project(
        project("x"),
        vec![VersionBuilder::new("x", "x1").incompatible("optifine").build()],
    );

    let resolution = walk(&WalkRequest::install(roots(&["x"]), false), &empty_manifest(), &catalog).await;
    assert!(resolution.is_clean());
    assert_eq!(slugs(&resolution), vec!["x"]);
}

// ===== Refresh =====

#[tokio::test]
async fn test_refresh_selects_newer_version_and_keeps_dependency_of() {
    let catalog = MockCatalogClient::new().with_project(
        project("x"),
        vec![
            VersionBuilder::new("x", "x2").published("2024-06-01T00:00:00Z").build(),
            VersionBuilder::new("x", "x1").published("2024-01-01T00:00:00Z").build(),
        ],
    );
    let mut manifest = empty_manifest();
    let mut x = installed("x", "x1");
    x.dependency_of = Some("parent".into());
    manifest.insert(x);

    let request = WalkRequest::install(roots(&["x"]), false).refreshing(Channel::Stable);
    let resolution = walk(&request, &manifest, &catalog).await;

    assert_eq!(resolution.to_install[0].version_id, "x2");
    assert_eq!(resolution.to_install[0].dependency_of.as_deref(), Some("parent"));
}

#[tokio::test]
async fn test_refresh_compares_publish_times_not_strings() {
    // "00:00:00.5Z" sorts before "00:00:00Z" as text but is half a second later
    let catalog = MockCatalogClient::new().with_project(
        project("x"),
        vec![VersionBuilder::new("x", "x2").published("2024-01-01T00:00:00.5Z").build()],
    );
    let mut manifest = empty_manifest();
    manifest.insert(InstalledMod::from_selection(
        &project("x"),
        &VersionBuilder::new("x", "x1").published("2024-01-01T00:00:00Z").build(),
        None,
    )
    .unwrap());

    let request = WalkRequest::install(roots(&["x"]), false).refreshing(Channel::Stable);
    let resolution = walk(&request, &manifest, &catalog).await;
    assert_eq!(resolution.to_install[0].version_id, "x2");
}

#[test]
fn test_published_after_ignores_unparseable_dates() {
    let good = VersionBuilder::new("x", "a").published("2024-01-01T00:00:00Z").build();
    let bad = VersionBuilder::new("x", "b").published("yesterday").build();
    assert!(!published_after(&bad, &good));
    assert!(!published_after(&good, &bad));
    assert!(published_after(
        &good,
        &VersionBuilder::new("x", "c").published("2023-12-31T23:59:59.999+00:00").build()
    ));
}

#[tokio::test]
async fn test_refresh_never_downgrades() {
    let catalog = MockCatalogClient::new().with_project(
        project("x"),
        vec![
            VersionBuilder::new("x", "beta")
                .version_type(VersionType::Beta)
                .published("2024-09-01T00:00:00Z")
                .build(),
            VersionBuilder::new("x", "release").published("2024-06-01T00:00:00Z").build(),
        ],
    );
    let mut manifest = empty_manifest();
    manifest.insert(InstalledMod::from_selection(
        &project("x"),
        &VersionBuilder::new("x", "manual").published("2024-08-01T00:00:00Z").build(),
        None,
    )
    .unwrap());

    let request = WalkRequest::install(roots(&["x"]), false).refreshing(Channel::Stable);
    let resolution = walk(&request, &manifest, &catalog).await;
    assert_eq!(resolution.to_install[0].version_id, "manual");
}

#[tokio::test]
async fn test_refresh_keeps_prerelease_channel_for_prerelease_installs() {
    let catalog = MockCatalogClient::new().with_project(
        project("x"),
        vec![
            VersionBuilder::new("x", "beta2")
                .version_type(VersionType::Beta)
                .published("2024-09-01T00:00:00Z")
                .build(),
            VersionBuilder::new("x", "release").published("2024-06-01T00:00:00Z").build(),
        ],
    );
    let mut manifest = empty_manifest();
    manifest.insert(InstalledMod::from_selection(
        &project("x"),
        &VersionBuilder::new("x", "beta1")
            .version_type(VersionType::Beta)
            .published("2024-07-01T00:00:00Z")
            .build(),
        None,
    )
    .unwrap());

    let request = WalkRequest::install(roots(&["x"]), false).refreshing(Channel::Stable);
    let resolution = walk(&request, &manifest, &catalog).await;
    assert_eq!(resolution.to_install[0].version_id, "beta2");
}

#[tokio::test]
async fn test_refresh_reselects_stale_dependencies() {
    let catalog = MockCatalogClient::new()
        .with_project(
            project("x"),
            vec![
                VersionBuilder::new("x", "x2")
                    .game_versions(&["1.20.4"])
                    .requires("y")
                    .build(),
            ],
        )
        .with_project(
            project("y"),
            vec![VersionBuilder::new("y", "y2").game_versions(&["1.20.4"]).build()],
        );
    let mut manifest = empty_manifest();
    manifest.insert(installed("x", "x1"));
    manifest.insert(installed("y", "y1"));
    manifest.game_version = "1.20.4".to_string();

    let request = WalkRequest::install(roots(&["x"]), false).refreshing(Channel::Stable);
    let resolution = walk(&request, &manifest, &catalog).await;

    assert!(resolution.is_clean());
    let versions: Vec<&str> = resolution.to_install.iter().map(|m| m.version_id.as_str()).collect();
    assert_eq!(versions, vec!["x2", "y2"]);
}
