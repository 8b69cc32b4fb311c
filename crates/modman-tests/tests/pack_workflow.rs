//! Pack exports what players need, optionally with server-only mods

use modman_lib::application::Commands;
use modman_tests::testing::{VersionBuilder, project, server_only_project};
use modman_tests::{TestServer, install};
use std::fs::File;

fn archive_names(server: &TestServer) -> Vec<String> {
    let file = File::open(server.dir.path().join("workflow.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

async fn server_with_mixed_mods() -> TestServer {
    let mut server = TestServer::new().await;
    server
        .publish(project("sodium"), VersionBuilder::new("sodium", "s1"))
        .await;
    server
        .publish(
            server_only_project("spark"),
            VersionBuilder::new("spark", "k1"),
        )
        .await;
    server.run(install(&["sodium", "spark"])).await.unwrap();
    server
}

#[tokio::test]
async fn pack_leaves_out_server_only_mods() {
    let server = server_with_mixed_mods().await;

    server
        .run(Commands::Pack {
            include_server_side: false,
        })
        .await
        .unwrap();

    assert_eq!(archive_names(&server), vec!["sodium-s1.jar"]);
}

#[tokio::test]
async fn pack_with_server_flag_includes_everything() {
    let server = server_with_mixed_mods().await;

    server
        .run(Commands::Pack {
            include_server_side: true,
        })
        .await
        .unwrap();

    assert_eq!(
        archive_names(&server),
        vec!["sodium-s1.jar", "spark-k1.jar"]
    );
}
