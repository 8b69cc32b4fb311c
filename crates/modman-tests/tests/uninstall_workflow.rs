//! Uninstall keeps dependencies that were pulled in by the removed mod

use modman_tests::testing::{VersionBuilder, project};
use modman_tests::{TestServer, install, uninstall};

#[tokio::test]
async fn dependencies_stay_and_are_released() {
    let mut server = TestServer::new().await;
    server
        .publish(
            project("create"),
            VersionBuilder::new("create", "c1").requires("flywheel"),
        )
        .await;
    server
        .publish(project("flywheel"), VersionBuilder::new("flywheel", "f1"))
        .await;
    server.run(install(&["create"])).await.unwrap();

    let report = server.run(uninstall(&["create"])).await.unwrap();

    assert!(report.is_success());
    let manifest = server.manifest();
    assert!(!manifest.contains("create"));
    assert_eq!(manifest.mods["flywheel"].dependency_of, None);
    assert_eq!(server.dir.mod_files(), vec!["flywheel-f1.jar"]);
}

#[tokio::test]
async fn uninstalling_something_absent_fails_only_that_id() {
    let mut server = TestServer::new().await;
    server
        .publish(project("lithium"), VersionBuilder::new("lithium", "l1"))
        .await;
    server.run(install(&["lithium"])).await.unwrap();

    let report = server
        .run(uninstall(&["lithium", "ghost"]))
        .await
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].identifier, "ghost");
    assert!(server.manifest().mods.is_empty());
}
