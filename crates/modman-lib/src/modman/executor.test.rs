use super::*;
use crate::modman::integrity::IntegrityReport;
use crate::modman::reconcile::{apply, remove};
use crate::networking::NetworkingConfig;
use crate::primitives::ModLoader;
use crate::testing::{ServerDirFixture, VersionBuilder, jar_bytes, project};
use mockito::{Mock, Server, ServerGuard};
use std::collections::HashSet;

fn executor() -> Executor {
    Executor::new(NetworkingManager::new(NetworkingConfig::default()).unwrap())
}

fn served(server: &ServerGuard, slug: &str, vid: &str) -> InstalledMod {
    let version = VersionBuilder::new(slug, vid).served_from(&server.url()).build();
    InstalledMod::from_selection(&project(slug), &version, None).unwrap()
}

async fn serve(server: &mut ServerGuard, slug: &str, vid: &str) -> Mock {
    server
        .mock("GET", format!("/{slug}/{vid}.jar").as_str())
        .with_status(200)
        .with_body(jar_bytes(slug, vid))
        .create_async()
        .await
}

fn empty_manifest() -> ProjectManifest {
    ProjectManifest::new("t", "1.20.1", ModLoader::Fabric, None)
}

// ===== installs =====

#[tokio::test]
async fn test_downloads_are_committed() {
    let mut server = Server::new_async().await;
    let _a = serve(&mut server, "a", "a1").await;
    let _b = serve(&mut server, "b", "b1").await;
    let fixture = ServerDirFixture::new().unwrap();
    let mut manifest = empty_manifest();

    let plan = apply(
        &manifest,
        &[served(&server, "a", "a1"), served(&server, "b", "b1")],
        &HashSet::new(),
        &IntegrityReport::default(),
    );
    let report = executor()
        .execute(&mut manifest, &plan.actions, &fixture.mods_dir())
        .await;

    assert!(report.is_success());
    assert_eq!(report.completed.len(), 2);
    assert_eq!(manifest, plan.manifest);
    assert_eq!(fixture.mod_files(), vec!["a-a1.jar", "b-b1.jar"]);
}

#[tokio::test]
async fn test_failed_download_is_not_committed() {
    let mut server = Server::new_async().await;
    let _a = serve(&mut server, "a", "a1").await;
    let _bad = server
        .mock("GET", "/bad/bad1.jar")
        .with_status(200)
        .with_body("not the advertised bytes")
        .create_async()
        .await;
    let fixture = ServerDirFixture::new().unwrap();
    let mut manifest = empty_manifest();

    let plan = apply(
        &manifest,
        &[served(&server, "a", "a1"), served(&server, "bad", "bad1")],
        &HashSet::new(),
        &IntegrityReport::default(),
    );
    let report = executor()
        .execute(&mut manifest, &plan.actions, &fixture.mods_dir())
        .await;

    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].identifier, "bad");
    assert!(report.failures[0].message.contains("Checksum mismatch"));
    assert!(manifest.contains("a"));
    assert!(!manifest.contains("bad"));
    assert_eq!(fixture.mod_files(), vec!["a-a1.jar"]);
}

#[tokio::test]
async fn test_upgrade_supersedes_old_file_after_cleanup() {
    let mut server = Server::new_async().await;
    let _new = serve(&mut server, "a", "a2").await;
    let fixture = ServerDirFixture::new().unwrap();

    let old = served(&server, "a", "a1");
    fixture.materialize(&old, &jar_bytes("a", "a1")).unwrap();
    let mut manifest = empty_manifest();
    manifest.insert(old);
    let integrity = IntegrityReport::scan(&manifest, &fixture.mods_dir());

    let plan = apply(&manifest, &[served(&server, "a", "a2")], &HashSet::new(), &integrity);
    let report = executor()
        .execute(&mut manifest, &plan.actions, &fixture.mods_dir())
        .await;

    assert!(report.is_success());
    assert_eq!(manifest.find("a").unwrap().version_id, "a2");
    assert_eq!(fixture.mod_files(), vec!["a-a1.jar", "a-a2.jar"]);

    report.remove_superseded();
    assert_eq!(fixture.mod_files(), vec!["a-a2.jar"]);
}

#[tokio::test]
async fn test_upgrade_never_supersedes_a_path_outside_mods() {
    let mut server = Server::new_async().await;
    let _new = serve(&mut server, "a", "a2").await;
    let fixture = ServerDirFixture::new().unwrap();
    let outside = fixture.path().join("server.properties");
    std::fs::write(&outside, "motd=keep me").unwrap();

    let mut old = served(&server, "a", "a1");
    old.file_name = "../server.properties".to_string();
    let mut manifest = empty_manifest();
    manifest.insert(old.clone());

    let actions = vec![Action::Upgrade {
        from: old,
        to: served(&server, "a", "a2"),
    }];
    let report = executor()
        .execute(&mut manifest, &actions, &fixture.mods_dir())
        .await;

    assert!(report.is_success());
    assert_eq!(manifest.find("a").unwrap().version_id, "a2");
    assert!(report.superseded.is_empty());

    report.remove_superseded();
    assert!(outside.exists());
    assert_eq!(fixture.mod_files(), vec!["a-a2.jar"]);
}

#[tokio::test]
async fn test_interrupt_commits_nothing_in_flight() {
    let mut server = Server::new_async().await;
    let _a = serve(&mut server, "a", "a1").await;
    let fixture = ServerDirFixture::new().unwrap();
    let mut manifest = empty_manifest();

    let plan = apply(
        &manifest,
        &[served(&server, "a", "a1")],
        &HashSet::new(),
        &IntegrityReport::default(),
    );
    let report = executor()
        .execute_until(
            &mut manifest,
            &plan.actions,
            &fixture.mods_dir(),
            std::future::ready(()),
        )
        .await;

    assert!(report.interrupted);
    assert!(!report.is_success());
    assert!(manifest.mods.is_empty());
    assert!(fixture.mod_files().is_empty());
}

// ===== removals =====

#[tokio::test]
async fn test_remove_deletes_file_and_releases_dependents() {
    let server = Server::new_async().await;
    let fixture = ServerDirFixture::new().unwrap();
    let x = served(&server, "x", "x1");
    let mut y = served(&server, "y", "y1");
    y.dependency_of = Some("x".into());
    fixture.materialize(&x, b"x").unwrap();
    fixture.materialize(&y, b"y").unwrap();

    let mut manifest = empty_manifest();
    manifest.insert(x);
    manifest.insert(y);

    let (plan, _) = remove(&manifest, &["x".to_string()]);
    let report = executor()
        .execute(&mut manifest, &plan.actions, &fixture.mods_dir())
        .await;

    assert!(report.is_success());
    assert!(!manifest.contains("x"));
    assert_eq!(manifest.find("y").unwrap().dependency_of, None);
    assert_eq!(fixture.mod_files(), vec!["y-y1.jar"]);
}

#[tokio::test]
async fn test_remove_tolerates_missing_file() {
    let server = Server::new_async().await;
    let fixture = ServerDirFixture::new().unwrap();
    let mut manifest = empty_manifest();
    manifest.insert(served(&server, "x", "x1"));

    let (plan, _) = remove(&manifest, &["x".to_string()]);
    let report = executor()
        .execute(&mut manifest, &plan.actions, &fixture.mods_dir())
        .await;

    assert!(report.is_success());
    assert!(manifest.mods.is_empty());
}
