use super::*;
use crate::testing::{ServerDirFixture, VersionBuilder, project, server_only_project};

fn entry(slug: &str, version_id: &str) -> InstalledMod {
    InstalledMod::from_selection(
        &project(slug),
        &VersionBuilder::new(slug, version_id).build(),
        None,
    )
    .unwrap()
}

fn sample_manifest() -> ProjectManifest {
    let mut manifest = ProjectManifest::new("survival", "1.20.1", ModLoader::Fabric, Some("0.15.11".into()));
    manifest.insert(entry("fabric-api", "v1"));
    let mut lithium = entry("lithium", "l1");
    lithium.dependency_of = Some("fabric-api".to_string());
    manifest.insert(lithium);
    manifest
}

// ===== InstalledMod =====

#[test]
fn test_from_selection_uses_primary_file() {
    let version = VersionBuilder::new("sodium", "s1").build();
    let installed = InstalledMod::from_selection(&server_only_project("sodium"), &version, None).unwrap();

    assert_eq!(installed.slug, "sodium");
    assert_eq!(installed.project_id, "id-sodium");
    assert_eq!(installed.file_name, "sodium-s1.jar");
    assert_eq!(installed.checksum, version.files[0].hashes.sha512);
    assert!(!installed.client_supported);
    assert!(installed.server_supported);
}

#[test]
fn test_from_selection_leaves_changelog_out_of_the_manifest() {
    let version = VersionBuilder::new("sodium", "s1").changelog("Faster chunks").build();
    let installed = InstalledMod::from_selection(&project("sodium"), &version, None).unwrap();

    assert_eq!(installed.version.changelog, None);
    assert_eq!(installed.version.id, "s1");
}

#[test]
fn test_from_selection_without_files_fails() {
    let version = VersionBuilder::new("empty", "e1").no_files().build();
    let err = InstalledMod::from_selection(&project("empty"), &version, None).unwrap_err();
    assert_eq!(
        err,
        ResolutionFailure::NoFiles {
            version_id: "e1".to_string()
        }
    );
}

// ===== ProjectManifest =====

#[test]
fn test_find_by_slug_or_project_id() {
    let manifest = sample_manifest();
    assert_eq!(manifest.find("lithium").unwrap().version_id, "l1");
    assert_eq!(manifest.find("id-lithium").unwrap().slug, "lithium");
    assert!(manifest.find("sodium").is_none());
    assert_eq!(manifest.key_of("id-fabric-api").as_deref(), Some("fabric-api"));
}

#[test]
fn test_find_by_name_accepts_titles_and_jar_names() {
    let manifest = sample_manifest();
    assert_eq!(manifest.find_by_name("LITHIUM").unwrap().slug, "lithium");
    assert_eq!(manifest.find_by_name("lithium-l1.jar").unwrap().slug, "lithium");
    assert!(manifest.find("lithium-l1.jar").is_none());
    assert!(manifest.find_by_name("sodium.jar").is_none());
}

#[test]
fn test_remove_by_project_id() {
    let mut manifest = sample_manifest();
    let removed = manifest.remove("id-lithium").unwrap();
    assert_eq!(removed.slug, "lithium");
    assert!(!manifest.contains("lithium"));
}

#[test]
fn test_stale_mods_after_game_version_bump() {
    let mut manifest = sample_manifest();
    assert!(manifest.stale_mods().is_empty());

    manifest.game_version = "1.20.4".to_string();
    assert_eq!(manifest.stale_mods().len(), 2);
}

#[test]
fn test_json_round_trip_is_lossless() {
    let manifest = sample_manifest();
    let json = serde_json::to_string_pretty(&manifest).unwrap();
    let parsed = ProjectManifest::from_json(Path::new("x"), &json).unwrap();
    assert_eq!(parsed, manifest);
}

#[test]
fn test_newer_schema_is_rejected() {
    let err = ProjectManifest::from_json(
        Path::new("x"),
        r#"{"schema_version": 9, "name": "a", "game_version": "1.20.1", "loader": "fabric"}"#,
    )
    .unwrap_err();
    assert!(matches!(err, ManifestError::UnsupportedSchema { found: 9, .. }));
}

#[test]
fn test_garbage_is_corrupt() {
    let err = ProjectManifest::from_json(Path::new("x"), "{not json").unwrap_err();
    assert!(matches!(err, ManifestError::Corrupt { .. }));

    let err = ProjectManifest::from_json(Path::new("x"), r#"{"hello": 1}"#).unwrap_err();
    assert!(matches!(err, ManifestError::Corrupt { .. }));
}

#[test]
fn test_unknown_loader_string_loads_as_unknown() {
    let manifest = ProjectManifest::from_json(
        Path::new("x"),
        r#"{"schema_version": 1, "name": "a", "game_version": "1.20.1", "loader": "neoforge"}"#,
    )
    .unwrap();
    assert_eq!(manifest.loader, ModLoader::Unknown);
}

#[test]
fn test_legacy_layout_is_migrated() {
    let version = VersionBuilder::new("fabric-api", "v1").build();
    let legacy = serde_json::json!({
        "modman": {
            "name": "old-server",
            "server": {"type": "fabric", "version": "1.20.1", "file": "/srv/fabric.jar"},
            "root": "/srv"
        },
        "mods": {
            "fabric-api": {"project": project("fabric-api"), "version": version}
        }
    });

    let manifest = ProjectManifest::from_json(Path::new("x"), &legacy.to_string()).unwrap();
    assert_eq!(manifest.schema_version, SCHEMA_VERSION);
    assert_eq!(manifest.name, "old-server");
    assert_eq!(manifest.loader, ModLoader::Fabric);
    assert_eq!(manifest.server_jar, Some(PathBuf::from("/srv/fabric.jar")));
    assert_eq!(manifest.find("fabric-api").unwrap().version_id, "v1");
}

#[test]
fn test_legacy_name_falls_back_to_root_dir() {
    let legacy = r#"{"modman": {"name": null, "server": {"type": "quilt", "version": "1.20.1"}, "root": "/srv/lobby"}, "mods": {}}"#;
    let manifest = ProjectManifest::from_json(Path::new("x"), legacy).unwrap();
    assert_eq!(manifest.name, "lobby");
    assert_eq!(manifest.loader, ModLoader::Quilt);
}

// ===== JsonManifestStore =====

#[test]
fn test_store_save_load_and_locate() {
    let fixture = ServerDirFixture::new().unwrap();
    let store = JsonManifestStore::new();
    let manifest = sample_manifest();

    assert!(!store.exists(fixture.path()));
    store.save(&manifest, fixture.path()).unwrap();
    assert!(store.exists(fixture.path()));

    let loaded = store.load(fixture.path()).unwrap();
    assert_eq!(loaded, manifest);

    // Located from a nested directory
    let located = store.locate(&fixture.mods_dir()).unwrap();
    assert_eq!(located, fixture.path());

    // No temporary files left behind
    let leftovers: Vec<_> = std::fs::read_dir(fixture.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_store_load_missing_is_not_found() {
    let fixture = ServerDirFixture::new().unwrap();
    let store = JsonManifestStore::new();
    assert!(matches!(
        store.load(fixture.path()),
        Err(ManifestError::NotFound { .. })
    ));
}

#[test]
fn test_store_load_corrupt_is_fatal() {
    let fixture = ServerDirFixture::new().unwrap();
    std::fs::write(fixture.path().join(MANIFEST_FILE), "[]").unwrap();
    assert!(matches!(
        JsonManifestStore::new().load(fixture.path()),
        Err(ManifestError::Corrupt { .. })
    ));
}
