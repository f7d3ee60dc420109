//! Shared harness for Tollgate integration tests.
//!
//! Spawns the real server on an ephemeral port and exposes a small HTTP
//! client for black-box testing of the token endpoints.

use std::net::SocketAddr;
use std::time::Duration;

use config::Config;
use server::ServeConfig;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout};

/// Test client for making HTTP requests to the test server.
pub struct TestClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    /// Create a new test client for the given base URL.
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Send a GET request to the given path.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("request to the test server failed")
    }
}

/// A running Tollgate server bound to an ephemeral port.
pub struct TestServer {
    /// Client pointed at the server.
    pub client: TestClient,
    /// The address the server is listening on.
    pub address: SocketAddr,
}

impl TestServer {
    /// Parse the given TOML configuration and serve it on an ephemeral port.
    pub async fn start(config_toml: &str) -> Self {
        let config: Config = toml::from_str(config_toml).expect("invalid test configuration");

        // Grab a free port, then hand the address to the server. The listener
        // must be dropped first since serve binds it itself.
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to reserve a test port");
        let address = listener.local_addr().expect("listener has no local address");
        drop(listener);

        tokio::spawn(server::serve(ServeConfig {
            listen_address: address,
            config,
        }));

        timeout(Duration::from_secs(5), async {
            while TcpStream::connect(address).await.is_err() {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("server did not start listening in time");

        Self {
            client: TestClient::new(format!("http://{address}")),
            address,
        }
    }

    /// Register a new bucket and return its identifier.
    pub async fn register_key(&self) -> String {
        let response = self.client.get("/register_key").await;
        assert_eq!(response.status(), 200);

        response
            .text()
            .await
            .expect("register_key response had no body")
            .trim()
            .to_owned()
    }

    /// Spend one token from the bucket registered under `key`.
    pub async fn use_token(&self, key: &str) -> reqwest::Response {
        self.client.get(&format!("/use_token?uuid={key}")).await
    }
}
