//! Install flows against a mock catalog and CDN

use modman_tests::testing::{VersionBuilder, project};
use modman_tests::{TestServer, install, install_with_optional, reinstall};

#[tokio::test]
async fn installs_a_single_mod_with_no_dependencies() {
    let mut server = TestServer::new().await;
    server
        .publish(project("fabric-api"), VersionBuilder::new("fabric-api", "fa1"))
        .await;

    let report = server.run(install(&["fabric-api"])).await.unwrap();

    assert!(report.is_success());
    let manifest = server.manifest();
    assert_eq!(manifest.mods.len(), 1);
    let entry = &manifest.mods["fabric-api"];
    assert_eq!(entry.version_id, "fa1");
    assert_eq!(entry.dependency_of, None);
    assert_eq!(server.dir.mod_files(), vec!["fabric-api-fa1.jar"]);
}

#[tokio::test]
async fn required_dependencies_follow_and_optional_ones_wait_for_the_flag() {
    let mut server = TestServer::new().await;
    server
        .publish(
            project("create"),
            VersionBuilder::new("create", "c1")
                .requires("flywheel")
                .optional("jei"),
        )
        .await;
    server
        .publish(project("flywheel"), VersionBuilder::new("flywheel", "f1"))
        .await;
    server
        .publish(project("jei"), VersionBuilder::new("jei", "j1"))
        .await;

    server.run(install(&["create"])).await.unwrap();

    let manifest = server.manifest();
    assert!(manifest.contains("create"));
    assert_eq!(
        manifest.mods["flywheel"].dependency_of.as_deref(),
        Some("create")
    );
    assert!(!manifest.contains("jei"));
    assert!(!server.dir.has_mod("jei-j1.jar"));

    server.run(install_with_optional(&["create"])).await.unwrap();

    let manifest = server.manifest();
    assert!(manifest.contains("jei"));
    assert!(server.dir.has_mod("jei-j1.jar"));
}

#[tokio::test]
async fn installing_again_changes_nothing() {
    let mut server = TestServer::new().await;
    server
        .publish(
            project("sodium"),
            VersionBuilder::new("sodium", "s1").requires("indium"),
        )
        .await;
    server
        .publish(project("indium"), VersionBuilder::new("indium", "i1"))
        .await;

    server.run(install(&["sodium"])).await.unwrap();
    let before = server.manifest();
    server.display.clear_calls();

    let report = server.run(install(&["sodium"])).await.unwrap();

    assert!(report.is_success());
    assert_eq!(server.manifest(), before);
    let transcript = server.display.transcript();
    assert!(transcript.contains("Up to date"), "{transcript}");
    assert!(!transcript.contains("add sodium"), "{transcript}");
}

#[tokio::test]
async fn reinstall_restores_a_deleted_file() {
    let mut server = TestServer::new().await;
    server
        .publish(project("lithium"), VersionBuilder::new("lithium", "l1"))
        .await;
    server.run(install(&["lithium"])).await.unwrap();
    std::fs::remove_file(server.dir.mods_dir().join("lithium-l1.jar")).unwrap();

    let report = server.run(reinstall(&["lithium"])).await.unwrap();

    assert!(report.is_success());
    assert!(server.dir.has_mod("lithium-l1.jar"));
}

#[tokio::test]
async fn checksum_mismatch_leaves_no_trace() {
    let mut server = TestServer::new().await;
    server
        .publish(
            project("broken"),
            VersionBuilder::new("broken", "b1").wrong_checksum(),
        )
        .await;

    let report = server.run(install(&["broken"])).await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failures[0].identifier, "broken");
    assert!(!server.manifest().contains("broken"));
    assert!(server.dir.mod_files().is_empty());
}

#[tokio::test]
async fn dependency_cycles_terminate() {
    let mut server = TestServer::new().await;
    server
        .publish(
            project("alpha"),
            VersionBuilder::new("alpha", "a1").requires("beta"),
        )
        .await;
    server
        .publish(
            project("beta"),
            VersionBuilder::new("beta", "b1").requires("alpha"),
        )
        .await;

    let report = server.run(install(&["alpha"])).await.unwrap();

    assert!(report.is_success());
    assert_eq!(
        server.dir.mod_files(),
        vec!["alpha-a1.jar", "beta-b1.jar"]
    );
}

#[tokio::test]
async fn a_required_edge_wins_over_an_optional_one() {
    let mut server = TestServer::new().await;
    server
        .publish(
            project("xaero"),
            VersionBuilder::new("xaero", "x1").optional("cloth"),
        )
        .await;
    server
        .publish(
            project("modmenu"),
            VersionBuilder::new("modmenu", "m1").requires("cloth"),
        )
        .await;
    server
        .publish(project("cloth"), VersionBuilder::new("cloth", "c1"))
        .await;

    let report = server.run(install(&["xaero", "modmenu"])).await.unwrap();

    assert!(report.is_success());
    assert!(server.manifest().contains("cloth"));
    assert!(server.dir.has_mod("cloth-c1.jar"));
}

#[tokio::test]
async fn one_unresolvable_mod_does_not_block_the_rest() {
    let mut server = TestServer::new().await;
    server
        .publish(project("good"), VersionBuilder::new("good", "g1"))
        .await;
    server
        .publish(
            project("wrong-loader"),
            VersionBuilder::new("wrong-loader", "w1").game_versions(&["1.12.2"]),
        )
        .await;

    let report = server
        .run(install(&["good", "wrong-loader"]))
        .await
        .unwrap();

    assert!(!report.is_success());
    assert!(
        report
            .failures
            .iter()
            .any(|failure| failure.identifier == "wrong-loader")
    );
    assert!(server.manifest().contains("good"));
    assert!(!server.manifest().contains("wrong-loader"));
}
