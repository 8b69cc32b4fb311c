use super::*;
use crate::testing::{ServerDirFixture, VersionBuilder, jar_bytes, project, sha512_hex};
use mockito::Server;

fn downloader() -> Downloader {
    Downloader::new(Arc::new(RateLimitedClient::new(reqwest::Client::new())))
}

fn part_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
        .count()
}

#[test]
fn test_checked_file_name() {
    assert!(checked_file_name("sodium-0.5.jar").is_ok());
    assert!(checked_file_name("../evil.jar").is_err());
    assert!(checked_file_name("sub/evil.jar").is_err());
    assert!(checked_file_name("..").is_err());
    assert!(checked_file_name("a\\b.jar").is_err());
}

#[tokio::test]
async fn test_fetch_file_verifies_and_moves_into_place() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/file.jar")
        .with_status(200)
        .with_body("jar bytes")
        .create_async()
        .await;
    let fixture = ServerDirFixture::new().unwrap();
    let dest = fixture.mods_dir().join("file.jar");

    let digest = downloader()
        .fetch_file(
            &format!("{}/file.jar", server.url()),
            &dest,
            Some(&sha512_hex(b"jar bytes")),
        )
        .await
        .unwrap();

    assert_eq!(digest, sha512_hex(b"jar bytes"));
    assert_eq!(std::fs::read(&dest).unwrap(), b"jar bytes");
    assert_eq!(part_files(&fixture.mods_dir()), 0);
}

#[tokio::test]
async fn test_checksum_mismatch_leaves_nothing_behind() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/file.jar")
        .with_status(200)
        .with_body("tampered")
        .create_async()
        .await;
    let fixture = ServerDirFixture::new().unwrap();
    let dest = fixture.mods_dir().join("file.jar");

    let err = downloader()
        .fetch_file(
            &format!("{}/file.jar", server.url()),
            &dest,
            Some(&sha512_hex(b"original")),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::ChecksumMismatch { .. }));
    assert!(!dest.exists());
    assert_eq!(part_files(&fixture.mods_dir()), 0);
}

#[tokio::test]
async fn test_mismatch_does_not_clobber_existing_file() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/file.jar")
        .with_status(200)
        .with_body("tampered")
        .create_async()
        .await;
    let fixture = ServerDirFixture::new().unwrap();
    let dest = fixture.write_mod("file.jar", b"previous").unwrap();

    let result = downloader()
        .fetch_file(
            &format!("{}/file.jar", server.url()),
            &dest,
            Some(&sha512_hex(b"original")),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(std::fs::read(&dest).unwrap(), b"previous");
}

#[tokio::test]
async fn test_http_error_status() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/gone.jar")
        .with_status(404)
        .create_async()
        .await;
    let fixture = ServerDirFixture::new().unwrap();

    let err = downloader()
        .fetch_file(
            &format!("{}/gone.jar", server.url()),
            &fixture.mods_dir().join("gone.jar"),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_fetch_installed_mod() {
    let mut server = Server::new_async().await;
    let version = VersionBuilder::new("lithium", "l1")
        .served_from(&server.url())
        .build();
    let _mock = server
        .mock("GET", "/lithium/l1.jar")
        .with_status(200)
        .with_body(jar_bytes("lithium", "l1"))
        .create_async()
        .await;
    let target = InstalledMod::from_selection(&project("lithium"), &version, None).unwrap();
    let fixture = ServerDirFixture::new().unwrap();

    let installed = downloader().fetch(&target, &fixture.mods_dir()).await.unwrap();

    assert_eq!(installed, target);
    assert!(fixture.has_mod("lithium-l1.jar"));
}
