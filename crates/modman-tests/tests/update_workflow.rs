//! Update flows: upgrades replace files only after the new one verifies

use modman_tests::testing::{VersionBuilder, project};
use modman_tests::{TestServer, install, update};

#[tokio::test]
async fn newer_release_replaces_the_installed_file() {
    let mut server = TestServer::new().await;
    server
        .publish(project("sodium"), VersionBuilder::new("sodium", "s1"))
        .await;
    server.run(install(&["sodium"])).await.unwrap();

    server
        .publish(
            project("sodium"),
            VersionBuilder::new("sodium", "s2").published("2024-03-01T00:00:00Z"),
        )
        .await;
    server.display.clear_calls();

    let report = server.run(update(&["sodium"])).await.unwrap();

    assert!(report.is_success());
    assert_eq!(server.manifest().mods["sodium"].version_id, "s2");
    assert_eq!(server.dir.mod_files(), vec!["sodium-s2.jar"]);
    let transcript = server.display.transcript();
    assert!(transcript.contains("upgrade sodium s1 -> s2"), "{transcript}");
}

#[tokio::test]
async fn failed_upgrade_keeps_the_old_version() {
    let mut server = TestServer::new().await;
    server
        .publish(project("lithium"), VersionBuilder::new("lithium", "l1"))
        .await;
    server.run(install(&["lithium"])).await.unwrap();

    server
        .publish(
            project("lithium"),
            VersionBuilder::new("lithium", "l2")
                .published("2024-03-01T00:00:00Z")
                .wrong_checksum(),
        )
        .await;

    let report = server.run(update(&[])).await.unwrap();

    assert!(!report.is_success());
    assert_eq!(server.manifest().mods["lithium"].version_id, "l1");
    assert_eq!(server.dir.mod_files(), vec!["lithium-l1.jar"]);
}

#[tokio::test]
async fn updating_an_unknown_mod_is_reported() {
    let server = TestServer::new().await;

    let report = server.run(update(&["ghost"])).await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failures[0].identifier, "ghost");
}
