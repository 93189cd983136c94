//! Shared fixtures for router tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use jobport_api::identity::{IdentityError, IdentityResult, MagicLinkRequest};
use jobport_api::{create_router, ApiConfig, AppState, AuthSession, IdentityProvider};
use jobport_models::{Principal, Profile};
use jobport_store::{InMemoryStore, JobStore, ProfileStore};

pub const ACME_TOKEN: &str = "token-acme";
pub const GLOBEX_TOKEN: &str = "token-globex";
pub const ORPHAN_TOKEN: &str = "token-orphan";

/// Identity provider double: fixed tokens, recorded magic links, and one
/// accepted auth code.
#[derive(Default)]
pub struct FakeIdentity {
    principals: HashMap<String, Principal>,
    pub magic_links: Mutex<Vec<MagicLinkRequest>>,
    pub signed_out: Mutex<Vec<String>>,
    pub refreshes: Mutex<Vec<String>>,
}

impl FakeIdentity {
    pub fn with_principal(mut self, token: &str, id: &str, email: &str) -> Self {
        self.principals.insert(
            token.to_string(),
            Principal {
                id: id.to_string(),
                email: Some(email.to_string()),
                user_metadata: Default::default(),
            },
        );
        self
    }

    fn session(access_token: &str) -> AuthSession {
        AuthSession {
            access_token: access_token.to_string(),
            refresh_token: format!("refresh-{}", access_token),
            expires_in: 3600,
            expires_at: None,
            user: None,
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn get_user(&self, access_token: &str) -> IdentityResult<Option<Principal>> {
        Ok(self.principals.get(access_token).cloned())
    }

    async fn send_magic_link(&self, request: &MagicLinkRequest) -> IdentityResult<()> {
        self.magic_links.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn exchange_code(&self, auth_code: &str, code_verifier: &str) -> IdentityResult<AuthSession> {
        if auth_code == "good-code" && !code_verifier.is_empty() {
            Ok(Self::session(ACME_TOKEN))
        } else {
            Err(IdentityError::Provider {
                status: 400,
                message: "invalid flow state".into(),
            })
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> IdentityResult<AuthSession> {
        self.refreshes.lock().unwrap().push(refresh_token.to_string());
        if refresh_token == "refresh-good" {
            Ok(Self::session(ACME_TOKEN))
        } else {
            Err(IdentityError::Provider {
                status: 400,
                message: "Invalid Refresh Token".into(),
            })
        }
    }

    async fn sign_out(&self, access_token: &str) -> IdentityResult<()> {
        self.signed_out.lock().unwrap().push(access_token.to_string());
        Ok(())
    }
}

pub fn profile(id: &str, username: &str, company: &str) -> Profile {
    Profile {
        id: id.to_string(),
        username: username.to_string(),
        company_name: Some(company.to_string()),
        full_name: None,
    }
}

/// Two companies with profiles plus a principal that has no profile.
pub async fn seeded() -> (InMemoryStore, Arc<FakeIdentity>) {
    let store = InMemoryStore::new();
    store.add_profile(profile("acme-id", "team@acme.com", "Acme")).await;
    store
        .add_profile(profile("globex-id", "hr@globex.com", "Globex"))
        .await;

    let identity = FakeIdentity::default()
        .with_principal(ACME_TOKEN, "acme-id", "team@acme.com")
        .with_principal(GLOBEX_TOKEN, "globex-id", "hr@globex.com")
        .with_principal(ORPHAN_TOKEN, "orphan-id", "nobody@nowhere.com");

    (store, Arc::new(identity))
}

pub fn test_config() -> ApiConfig {
    ApiConfig {
        site_url: "http://jobs.test".to_string(),
        ..ApiConfig::default()
    }
}

pub fn app_with(
    jobs: Arc<dyn JobStore>,
    profiles: Arc<dyn ProfileStore>,
    identity: Arc<dyn IdentityProvider>,
) -> Router {
    create_router(
        AppState::from_parts(test_config(), jobs, profiles, identity),
        None,
    )
}

pub fn app(store: &InMemoryStore, identity: Arc<FakeIdentity>) -> Router {
    app_with(Arc::new(store.clone()), Arc::new(store.clone()), identity)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send_request(app, request).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn job_body(title: &str, location: &str, job_type: &str) -> Value {
    serde_json::json!({
        "title": title,
        "location": location,
        "job_type": job_type,
        "description": "Design and build services",
    })
}
