//! Responses produced outside the handlers still use the error envelope.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;

use jobport_models::{Job, JobFields, JobId, JobListParams, NewJob};
use jobport_store::{InMemoryStore, JobListing, JobStore, StoreResult};

use common::*;

fn assert_envelope(response: &TestResponse, status: StatusCode, code: &str) {
    assert_eq!(response.status, status);
    assert_eq!(response.body["code"], code);
    assert!(
        matches!(&response.body["error"], Value::String(msg) if !msg.is_empty()),
        "missing error message: {}",
        response.body
    );
}

fn oversized_body(max: usize) -> Vec<u8> {
    let mut body = br#"{"title":""#.to_vec();
    body.resize(max + 1024, b'x');
    body.extend_from_slice(br#""}"#);
    body
}

#[tokio::test]
async fn test_unknown_route_is_not_found_envelope() {
    let (store, identity) = seeded().await;
    let app = app(&store, identity);

    let response = send(&app, Method::GET, "/nope", None, None).await;
    assert_envelope(&response, StatusCode::NOT_FOUND, "not_found");
}

#[tokio::test]
async fn test_wrong_method_is_envelope() {
    let (store, identity) = seeded().await;
    let app = app(&store, identity);

    let response = send(&app, Method::PATCH, "/jobs/1", None, None).await;
    assert_envelope(&response, StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed");

    let response = send(&app, Method::POST, "/health", None, None).await;
    assert_envelope(&response, StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed");
}

#[tokio::test]
async fn test_undecodable_path_segment_is_validation_error() {
    let (store, identity) = seeded().await;
    let app = app(&store, identity);

    let response = send(&app, Method::GET, "/jobs/%FF", None, None).await;
    assert_envelope(&response, StatusCode::BAD_REQUEST, "validation_error");
}

#[tokio::test]
async fn test_oversized_body_is_envelope() {
    let (store, identity) = seeded().await;
    let app = app(&store, identity);
    let max = test_config().max_body_size;

    // Rejected up front from Content-Length.
    let body = oversized_body(max);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/jobs")
        .header(header::AUTHORIZATION, format!("Bearer {}", ACME_TOKEN))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();
    let response = send_request(&app, request).await;
    assert_envelope(&response, StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large");

    // Rejected while the handler buffers the body.
    let request = Request::builder()
        .method(Method::POST)
        .uri("/jobs")
        .header(header::AUTHORIZATION, format!("Bearer {}", ACME_TOKEN))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(oversized_body(max)))
        .unwrap();
    let response = send_request(&app, request).await;
    assert_envelope(&response, StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large");

    let listing = store.list_jobs(&JobListParams::default()).await.unwrap();
    assert_eq!(listing.total, 0);
}

/// Job store that stalls on listing.
struct StalledStore(InMemoryStore);

#[async_trait]
impl JobStore for StalledStore {
    async fn list_jobs(&self, params: &JobListParams) -> StoreResult<JobListing> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        self.0.list_jobs(params).await
    }

    async fn get_job(&self, id: &JobId) -> StoreResult<Option<Job>> {
        self.0.get_job(id).await
    }

    async fn insert_job(&self, job: &NewJob) -> StoreResult<Vec<Job>> {
        self.0.insert_job(job).await
    }

    async fn update_job(&self, id: &JobId, fields: &JobFields) -> StoreResult<Option<Job>> {
        self.0.update_job(id, fields).await
    }

    async fn delete_job(&self, id: &JobId) -> StoreResult<bool> {
        self.0.delete_job(id).await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.0.ping().await
    }
}

#[tokio::test]
async fn test_timeout_is_envelope() {
    let (store, identity) = seeded().await;
    let mut config = test_config();
    config.request_timeout = Duration::from_millis(50);
    let state = jobport_api::AppState::from_parts(
        config,
        Arc::new(StalledStore(store.clone())),
        Arc::new(store.clone()),
        identity,
    );
    let app = jobport_api::create_router(state, None);

    let response = send(&app, Method::GET, "/jobs", None, None).await;
    assert_envelope(&response, StatusCode::REQUEST_TIMEOUT, "timeout");
}
