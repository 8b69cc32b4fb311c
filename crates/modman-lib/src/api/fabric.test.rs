use super::*;
use mockito::Server;

fn component(version: &str, stable: bool) -> ComponentVersion {
    ComponentVersion {
        version: version.to_string(),
        stable,
    }
}

async fn meta_server() -> (mockito::ServerGuard, FabricMetaClient) {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v2/versions/game/intermediary")
        .with_status(200)
        .with_body(
            r#"[{"version": "24w14a", "stable": false}, {"version": "1.20.4", "stable": true}, {"version": "1.20.1", "stable": true}]"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/v2/versions/loader/1.20.4")
        .with_status(200)
        .with_body(
            r#"[
                {"loader": {"version": "0.16.0-beta.1", "stable": false}, "intermediary": {"version": "1.20.4"}},
                {"loader": {"version": "0.15.11", "stable": true}, "intermediary": {"version": "1.20.4"}},
                {"loader": {"version": "0.15.9", "stable": true}, "intermediary": {"version": "1.20.4"}}
            ]"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/v2/versions/installer")
        .with_status(200)
        .with_body(r#"[{"version": "1.0.1", "stable": true, "url": "x", "maven": "y"}, {"version": "0.11.2", "stable": true}]"#)
        .create_async()
        .await;

    let http = Arc::new(RateLimitedClient::new(reqwest::Client::new()));
    let client = FabricMetaClient::with_base_url(http, format!("{}/v2", server.url()));
    (server, client)
}

#[test]
fn test_latest_stable_uses_semver_ordering() {
    let versions = vec![
        component("0.9.3", true),
        component("0.15.11", true),
        component("0.16.0", false),
        component("0.15.9", true),
    ];
    assert_eq!(latest_stable(&versions).as_deref(), Some("0.15.11"));
    assert_eq!(latest_stable(&[component("1.0.0", false)]), None);
}

#[test]
fn test_jar_name() {
    let spec = FabricServerSpec {
        game_version: "1.20.4".to_string(),
        loader_version: "0.15.11".to_string(),
        installer_version: "1.0.1".to_string(),
    };
    assert_eq!(
        spec.jar_name(),
        "fabric-server-mc.1.20.4-loader.0.15.11-launcher.1.0.1.jar"
    );
}

#[tokio::test]
async fn test_resolve_latest_everything() {
    let (_server, client) = meta_server().await;

    let spec = client.resolve(Some("latest"), None, None).await.unwrap();
    assert_eq!(spec.game_version, "1.20.4");
    assert_eq!(spec.loader_version, "0.15.11");
    assert_eq!(spec.installer_version, "1.0.1");
    assert!(
        client
            .server_jar_url(&spec)
            .ends_with("/v2/versions/loader/1.20.4/0.15.11/1.0.1/server/jar")
    );
}

#[tokio::test]
async fn test_resolve_keeps_explicit_versions() {
    let (_server, client) = meta_server().await;

    let spec = client
        .resolve(Some("1.20.4"), Some("0.15.9"), Some("0.11.2"))
        .await
        .unwrap();
    assert_eq!(spec.loader_version, "0.15.9");
    assert_eq!(spec.installer_version, "0.11.2");
}

#[tokio::test]
async fn test_resolve_rejects_unknown_game_version() {
    let (_server, client) = meta_server().await;

    let err = client.resolve(Some("0.0.1"), None, None).await.unwrap_err();
    assert!(matches!(err, FabricMetaError::UnknownGameVersion { .. }));
}
