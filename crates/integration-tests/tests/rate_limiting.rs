//! Integration tests for the token endpoints.

use indoc::indoc;
use integration_tests::TestServer;
use serde_json::json;

const DEFAULT_CONFIG: &str = indoc! {r#"
    [server]
"#};

#[tokio::test]
async fn draining_a_fresh_bucket_hits_the_rate_limit() {
    let server = TestServer::start(DEFAULT_CONFIG).await;
    let key = server.register_key().await;

    let mut results = Vec::new();
    for i in 1..=7 {
        let response = server.use_token(&key).await;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap().trim().to_owned();

        results.push(json!({
            "body": body,
            "request": i,
            "status": status,
        }));
    }

    insta::assert_json_snapshot!(results, @r#"
    [
      {
        "body": "Token accepted, 4 tokens left",
        "request": 1,
        "status": 200
      },
      {
        "body": "Token accepted, 3 tokens left",
        "request": 2,
        "status": 200
      },
      {
        "body": "Token accepted, 2 tokens left",
        "request": 3,
        "status": 200
      },
      {
        "body": "Token accepted, 1 tokens left",
        "request": 4,
        "status": 200
      },
      {
        "body": "Token accepted, 0 tokens left",
        "request": 5,
        "status": 200
      },
      {
        "body": "Rate limit exceeded",
        "request": 6,
        "status": 429
      },
      {
        "body": "Rate limit exceeded",
        "request": 7,
        "status": 429
      }
    ]
    "#);
}

#[tokio::test]
async fn registered_keys_are_valid_uuids() {
    let server = TestServer::start(DEFAULT_CONFIG).await;

    let key = server.register_key().await;

    assert!(uuid::Uuid::parse_str(&key).is_ok(), "unexpected key format: {key}");
}

#[tokio::test]
async fn unknown_key_is_not_found() {
    let server = TestServer::start(DEFAULT_CONFIG).await;

    let response = server.use_token("5cb16a9a-1446-4259-8da3-6a94e9e12b90").await;

    assert_eq!(response.status(), 404);
    assert_eq!(response.text().await.unwrap().trim(), "Bucket not found");
}

#[tokio::test]
async fn missing_key_parameter_is_not_found() {
    let server = TestServer::start(DEFAULT_CONFIG).await;

    let response = server.client.get("/use_token").await;

    assert_eq!(response.status(), 404);
    assert_eq!(response.text().await.unwrap().trim(), "Bucket not found");
}

#[tokio::test]
async fn buckets_are_tracked_per_key() {
    let server = TestServer::start(DEFAULT_CONFIG).await;

    let first = server.register_key().await;
    let second = server.register_key().await;
    assert_ne!(first, second);

    for _ in 0..5 {
        assert_eq!(server.use_token(&first).await.status(), 200);
    }
    assert_eq!(server.use_token(&first).await.status(), 429);

    // The second client's bucket is untouched.
    let response = server.use_token(&second).await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap().trim(), "Token accepted, 4 tokens left");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_requests_cannot_overdraw_a_bucket() {
    let server = TestServer::start(DEFAULT_CONFIG).await;
    let key = server.register_key().await;

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let client = reqwest::Client::new();
            let url = format!("http://{}/use_token?uuid={key}", server.address);

            tokio::spawn(async move { client.get(url).send().await.unwrap().status().as_u16() })
        })
        .collect();

    let mut accepted = 0;
    let mut limited = 0;

    for handle in handles {
        match handle.await.unwrap() {
            200 => accepted += 1,
            429 => limited += 1,
            other => unreachable!("unexpected status {other}"),
        }
    }

    assert_eq!(accepted, 5);
    assert_eq!(limited, 15);
}
