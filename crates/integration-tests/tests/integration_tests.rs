//! Server surface tests: health endpoint and configuration handling.

use indoc::indoc;
use integration_tests::TestServer;

#[tokio::test]
async fn health_endpoint_enabled_by_default() {
    let config = indoc! {r#"
        [server]
    "#};

    let server = TestServer::start(config).await;
    let response = server.client.get("/health").await;

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = serde_json::from_str(&response.text().await.unwrap()).unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "status": "healthy"
    }
    "#);
}

#[tokio::test]
async fn health_endpoint_custom_path() {
    let config = indoc! {r#"
        [server.health]
        enabled = true
        path = "/healthz"
    "#};

    let server = TestServer::start(config).await;

    assert_eq!(server.client.get("/healthz").await.status(), 200);
    assert_eq!(server.client.get("/health").await.status(), 404);
}

#[tokio::test]
async fn health_endpoint_can_be_disabled() {
    let config = indoc! {r#"
        [server.health]
        enabled = false
    "#};

    let server = TestServer::start(config).await;

    assert_eq!(server.client.get("/health").await.status(), 404);
}

#[tokio::test]
async fn token_endpoints_work_alongside_cors_configuration() {
    let config = indoc! {r#"
        [server.cors]
        allow_origins = ["https://example.com"]
        allow_methods = ["GET"]
    "#};

    let server = TestServer::start(config).await;
    let key = server.register_key().await;

    assert_eq!(server.use_token(&key).await.status(), 200);
}
