//! Hosted identity provider client.
//!
//! Speaks the GoTrue dialect: magic links with PKCE, code exchange,
//! refresh, token introspection and sign-out. Credentials and emails are
//! entirely the provider's business; this side only relays.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use jobport_models::Principal;

// =============================================================================
// Errors
// =============================================================================

pub type IdentityResult<T> = Result<T, IdentityError>;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity configuration error: {0}")]
    Config(String),

    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IdentityError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build from a provider error body, picking the first message field the
    /// provider filled in.
    pub fn from_body(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ProviderBody {
            msg: Option<String>,
            error_description: Option<String>,
            message: Option<String>,
            error: Option<String>,
        }

        let message = serde_json::from_str::<ProviderBody>(body)
            .ok()
            .and_then(|b| b.msg.or(b.error_description).or(b.message).or(b.error))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Identity provider returned {}", status));

        Self::Provider { status, message }
    }
}

// =============================================================================
// Types
// =============================================================================

/// Tokens issued by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds
    #[serde(default)]
    pub expires_in: i64,
    /// Absolute expiry as Unix seconds, when the provider reports it
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub user: Option<Principal>,
}

impl AuthSession {
    /// Absolute expiry, falling back to `now + expires_in`.
    pub fn expires_at_or(&self, now: i64) -> i64 {
        self.expires_at.unwrap_or(now + self.expires_in)
    }
}

/// A passwordless sign-in email request.
#[derive(Debug, Clone, PartialEq)]
pub struct MagicLinkRequest {
    pub email: String,
    /// Whether the provider may create a new principal for this address
    pub create_user: bool,
    /// User metadata attached on creation
    pub data: Option<serde_json::Value>,
    /// Where the emailed link lands
    pub redirect_to: String,
    /// S256 challenge of the caller-held verifier
    pub code_challenge: String,
}

/// Operations the API needs from the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Principal for an access token; `None` when the provider rejects it.
    async fn get_user(&self, access_token: &str) -> IdentityResult<Option<Principal>>;

    async fn send_magic_link(&self, request: &MagicLinkRequest) -> IdentityResult<()>;

    async fn exchange_code(&self, auth_code: &str, code_verifier: &str) -> IdentityResult<AuthSession>;

    async fn refresh_session(&self, refresh_token: &str) -> IdentityResult<AuthSession>;

    async fn sign_out(&self, access_token: &str) -> IdentityResult<()>;
}

// =============================================================================
// PKCE
// =============================================================================

/// Random code verifier: 64 characters from the unreserved set.
pub fn generate_code_verifier() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// S256 challenge for a verifier.
pub fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Project base URL
    pub url: String,
    /// Public (anon) key
    pub anon_key: String,
    pub timeout: Duration,
}

impl IdentityConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> IdentityResult<Self> {
        let url = first_env(&["IDENTITY_URL", "SUPABASE_URL"])
            .ok_or_else(|| IdentityError::config("IDENTITY_URL or SUPABASE_URL must be set"))?;
        let anon_key = first_env(&["IDENTITY_ANON_KEY", "SUPABASE_ANON_KEY"]).ok_or_else(|| {
            IdentityError::config("IDENTITY_ANON_KEY or SUPABASE_ANON_KEY must be set")
        })?;
        Ok(Self::new(url, anon_key))
    }
}

fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| std::env::var(k).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

// =============================================================================
// GoTrue client
// =============================================================================

#[derive(Clone)]
pub struct GoTrueClient {
    http: Client,
    anon_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct OtpBody<'a> {
    email: &'a str,
    create_user: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a serde_json::Value>,
    code_challenge: &'a str,
    code_challenge_method: &'static str,
}

impl GoTrueClient {
    pub fn new(config: IdentityConfig) -> IdentityResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("jobport-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: format!("{}/auth/v1", config.url.trim_end_matches('/')),
            anon_key: config.anon_key,
        })
    }

    pub fn from_env() -> IdentityResult<Self> {
        Self::new(IdentityConfig::from_env()?)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
    }

    async fn check(response: reqwest::Response) -> IdentityResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(IdentityError::from_body(status.as_u16(), &body))
    }

    async fn token(&self, grant_type: &str, body: serde_json::Value) -> IdentityResult<AuthSession> {
        let response = self
            .post("/token")
            .query(&[("grant_type", grant_type)])
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn get_user(&self, access_token: &str) -> IdentityResult<Option<Principal>> {
        async {
            let response = self
                .http
                .get(format!("{}/user", self.base_url))
                .header("apikey", &self.anon_key)
                .bearer_auth(access_token)
                .send()
                .await?;

            match response.status() {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    debug!("Access token rejected by identity provider");
                    Ok(None)
                }
                _ => {
                    let response = Self::check(response).await?;
                    Ok(Some(response.json().await?))
                }
            }
        }
        .instrument(info_span!("identity_request", operation = "get_user"))
        .await
    }

    async fn send_magic_link(&self, request: &MagicLinkRequest) -> IdentityResult<()> {
        let body = OtpBody {
            email: &request.email,
            create_user: request.create_user,
            data: request.data.as_ref(),
            code_challenge: &request.code_challenge,
            code_challenge_method: "s256",
        };

        async {
            let response = self
                .post("/otp")
                .query(&[("redirect_to", request.redirect_to.as_str())])
                .json(&body)
                .send()
                .await?;
            Self::check(response).await.map(|_| ())
        }
        .instrument(info_span!("identity_request", operation = "send_magic_link"))
        .await
    }

    async fn exchange_code(&self, auth_code: &str, code_verifier: &str) -> IdentityResult<AuthSession> {
        self.token(
            "pkce",
            serde_json::json!({"auth_code": auth_code, "code_verifier": code_verifier}),
        )
        .instrument(info_span!("identity_request", operation = "exchange_code"))
        .await
    }

    async fn refresh_session(&self, refresh_token: &str) -> IdentityResult<AuthSession> {
        self.token(
            "refresh_token",
            serde_json::json!({"refresh_token": refresh_token}),
        )
        .instrument(info_span!("identity_request", operation = "refresh_session"))
        .await
    }

    async fn sign_out(&self, access_token: &str) -> IdentityResult<()> {
        async {
            let response = self
                .post("/logout")
                .bearer_auth(access_token)
                .send()
                .await?;
            Self::check(response).await.map(|_| ())
        }
        .instrument(info_span!("identity_request", operation = "sign_out"))
        .await
    }
}
