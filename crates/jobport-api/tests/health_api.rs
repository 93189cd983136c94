//! Probe routes.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use metrics_exporter_prometheus::PrometheusBuilder;

use jobport_api::{create_router, AppState};
use jobport_store::{MockJobStore, StoreError};

use common::*;

#[tokio::test]
async fn test_health_reports_version() {
    let (store, identity) = seeded().await;
    let app = app(&store, identity);

    let res = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "healthy");
    assert_eq!(res.body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_ready_when_store_answers() {
    let (store, identity) = seeded().await;
    let app = app(&store, identity);

    let res = send(&app, Method::GET, "/ready", None, None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ready");
    assert_eq!(res.body["checks"]["store"]["status"], "ok");
}

#[tokio::test]
async fn test_degraded_when_store_fails() {
    let mut jobs = MockJobStore::new();
    jobs.expect_ping()
        .returning(|| Err(StoreError::ServerError(503, "upstream unavailable".into())));
    let (store, identity) = seeded().await;
    let app = app_with(Arc::new(jobs), Arc::new(store), identity);

    let res = send(&app, Method::GET, "/ready", None, None).await;

    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.body["status"], "degraded");
    assert_eq!(res.body["checks"]["store"]["status"], "error");
    assert!(res.body["checks"]["store"]["error"].is_string());
}

#[tokio::test]
async fn test_metrics_route_only_when_enabled() {
    let (store, identity) = seeded().await;
    let app = app(&store, identity.clone());
    let res = send(&app, Method::GET, "/metrics", None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let handle = PrometheusBuilder::new().build_recorder().handle();
    let state = AppState::from_parts(
        test_config(),
        Arc::new(store.clone()),
        Arc::new(store),
        identity,
    );
    let app = create_router(state, Some(handle));
    let res = send(&app, Method::GET, "/metrics", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
}
