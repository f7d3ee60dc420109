//! Tollgate server library.
//!
//! Provides a reusable serve function to run Tollgate either from the
//! binary, or from the integration tests.

#![deny(missing_docs)]

mod cors;
mod health;
mod tokens;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::anyhow;
use axum::{Router, routing::get};
use axum_server::tls_rustls::RustlsConfig;
use config::Config;
use rate_limit::BucketStore;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// Configuration for serving Tollgate.
pub struct ServeConfig {
    /// The socket address (IP and port) the server will bind to.
    pub listen_address: SocketAddr,
    /// The deserialized Tollgate TOML configuration.
    pub config: Config,
}

/// Starts and runs the Tollgate server with the provided configuration.
pub async fn serve(ServeConfig { listen_address, config }: ServeConfig) -> anyhow::Result<()> {
    let store = Arc::new(BucketStore::new());

    let cors = if let Some(cors_config) = &config.server.cors {
        cors::generate(cors_config)
    } else {
        CorsLayer::permissive()
    };

    let mut app = tokens::router(store).layer(cors.clone());

    if config.server.health.enabled {
        if let Some(listen) = config.server.health.listen {
            tokio::spawn(health::bind_health_endpoint(
                listen,
                config.server.tls.clone(),
                config.server.health.clone(),
            ));
        } else {
            let health_router = Router::new()
                .route(&config.server.health.path, get(health::health))
                .layer(cors);

            app = app.merge(health_router);
        }
    }

    let listener = TcpListener::bind(listen_address)
        .await
        .map_err(|e| anyhow!("Failed to bind to {listen_address}: {e}"))?;

    match &config.server.tls {
        Some(tls_config) => {
            let rustls_config = RustlsConfig::from_pem_file(&tls_config.certificate, &tls_config.key)
                .await
                .map_err(|e| anyhow!("Failed to load TLS certificate and key: {e}"))?;

            log::info!("Token endpoints available at: https://{listen_address}/register_key and /use_token");

            axum_server::from_tcp_rustls(listener.into_std()?, rustls_config)
                .serve(app.into_make_service())
                .await
                .map_err(|e| anyhow!("Failed to start HTTPS server: {e}"))?;
        }
        None => {
            log::info!("Token endpoints available at: http://{listen_address}/register_key and /use_token");

            axum::serve(listener, app)
                .await
                .map_err(|e| anyhow!("Failed to start HTTP server: {e}"))?;
        }
    }

    Ok(())
}
