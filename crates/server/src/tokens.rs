//! HTTP handlers for bucket registration and token use.

use std::sync::Arc;
use std::time::SystemTime;

use axum::Router;
use axum::extract::{Query, State};
use axum::routing::get;
use http::StatusCode;
use rate_limit::{BucketStore, BucketStoreError};
use serde::Deserialize;
use uuid::Uuid;

pub(super) fn router(store: Arc<BucketStore>) -> Router {
    Router::new()
        .route("/register_key", get(register_key))
        .route("/use_token", get(use_token))
        .with_state(store)
}

/// Allocates a fresh identifier, registers a full bucket under it and hands
/// the identifier back to the client as plain text.
async fn register_key(State(store): State<Arc<BucketStore>>) -> (StatusCode, String) {
    let key = Uuid::new_v4().to_string();

    match store.register(&key, SystemTime::now()) {
        Ok(_) => (StatusCode::OK, format!("{key}\n")),
        Err(BucketStoreError::DuplicateKey { .. }) => {
            // A v4 collision is not expected in practice, but when it happens
            // the existing bucket's accounting must survive.
            log::warn!("Generated key collided with an existing bucket");

            (
                StatusCode::CONFLICT,
                "Key collision, request a new key\n".to_owned(),
            )
        }
        Err(e) => {
            log::error!("Failed to register a bucket: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error\n".to_owned())
        }
    }
}

#[derive(Deserialize)]
struct UseTokenParams {
    uuid: Option<String>,
}

/// Spends one token from the bucket identified by the `uuid` query parameter.
async fn use_token(
    State(store): State<Arc<BucketStore>>,
    Query(params): Query<UseTokenParams>,
) -> (StatusCode, String) {
    let Some(key) = params.uuid else {
        return (StatusCode::NOT_FOUND, "Bucket not found\n".to_owned());
    };

    match store.consume_token(&key, SystemTime::now()) {
        Ok(outcome) if outcome.allowed => (
            StatusCode::OK,
            format!("Token accepted, {} tokens left\n", outcome.remaining),
        ),
        Ok(_) => {
            log::debug!("Request rejected due to an empty bucket");

            (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded\n".to_owned())
        }
        Err(BucketStoreError::NotFound { .. }) => (StatusCode::NOT_FOUND, "Bucket not found\n".to_owned()),
        Err(e) => {
            log::error!("Failed to consume a token: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error\n".to_owned())
        }
    }
}
