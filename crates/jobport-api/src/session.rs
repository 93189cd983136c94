//! Request-scoped session access.
//!
//! A [`Session`] is extracted per request from the bearer header or the
//! session cookie. It holds only the access token; the principal and the
//! profile are looked up on demand from the identity provider and the store.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use tracing::{debug, warn};

use jobport_models::{Principal, Profile};
use jobport_store::ProfileStore;

use crate::error::{ApiError, ApiResult};
use crate::identity::{AuthSession, IdentityProvider};
use crate::state::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "jobport-access-token";
pub const REFRESH_TOKEN_COOKIE: &str = "jobport-refresh-token";
pub const EXPIRES_AT_COOKIE: &str = "jobport-expires-at";
pub const CODE_VERIFIER_COOKIE: &str = "jobport-code-verifier";

/// Refresh when the access token has less than this many seconds left.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Access token chosen by the refresh middleware; overrides the cookie.
#[derive(Debug, Clone)]
pub struct RefreshedAccessToken(pub Option<String>);

/// The caller's session for one request.
#[derive(Clone)]
pub struct Session {
    access_token: Option<String>,
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
}

impl Session {
    pub fn new(
        access_token: Option<String>,
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            access_token,
            identity,
            profiles,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// The authenticated principal, or `None` without a valid session.
    pub async fn current_principal(&self) -> ApiResult<Option<Principal>> {
        let Some(token) = self.access_token.as_deref() else {
            return Ok(None);
        };
        Ok(self.identity.get_user(token).await?)
    }

    /// The principal's profile row.
    pub async fn current_profile(&self) -> ApiResult<Profile> {
        let principal = self
            .current_principal()
            .await?
            .ok_or_else(ApiError::unauthenticated)?;

        self.profiles
            .get_profile(&principal.id)
            .await?
            .ok_or_else(|| {
                debug!(principal_id = %principal.id, "Principal has no profile row");
                ApiError::profile_not_found("No company profile for this account")
            })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn access_token(parts: &Parts) -> Option<String> {
    if let Some(token) = bearer_token(parts) {
        return Some(token);
    }
    if let Some(RefreshedAccessToken(token)) = parts.extensions.get::<RefreshedAccessToken>() {
        return token.clone();
    }
    CookieJar::from_headers(&parts.headers)
        .get(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Axum extractor for the request session. Never rejects; a missing token
/// just means no principal.
#[axum::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Session::new(
            access_token(parts),
            Arc::clone(&state.identity),
            Arc::clone(&state.profiles),
        ))
    }
}

// =============================================================================
// Cookies
// =============================================================================

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Add the session cookies for freshly issued tokens.
pub fn set_session_cookies(jar: CookieJar, session: &AuthSession, secure: bool) -> CookieJar {
    let expires_at = session.expires_at_or(Utc::now().timestamp());
    jar.add(session_cookie(ACCESS_TOKEN_COOKIE, session.access_token.clone(), secure))
        .add(session_cookie(REFRESH_TOKEN_COOKIE, session.refresh_token.clone(), secure))
        .add(session_cookie(EXPIRES_AT_COOKIE, expires_at.to_string(), secure))
}

/// Remove every session cookie.
pub fn clear_session_cookies(jar: CookieJar) -> CookieJar {
    [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, EXPIRES_AT_COOKIE]
        .into_iter()
        .fold(jar, |jar, name| {
            jar.remove(Cookie::build(name).path("/").build())
        })
}

/// Short-lived cookie carrying the PKCE verifier between the magic-link
/// request and the callback.
pub fn code_verifier_cookie(verifier: String, secure: bool) -> Cookie<'static> {
    session_cookie(CODE_VERIFIER_COOKIE, verifier, secure)
}

pub fn clear_code_verifier(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(CODE_VERIFIER_COOKIE).path("/").build())
}

fn needs_refresh(jar: &CookieJar, now: i64) -> bool {
    if jar.get(REFRESH_TOKEN_COOKIE).is_none() {
        return false;
    }
    if jar.get(ACCESS_TOKEN_COOKIE).is_none() {
        return true;
    }
    jar.get(EXPIRES_AT_COOKIE)
        .and_then(|c| c.value().parse::<i64>().ok())
        .is_some_and(|expires_at| expires_at - now <= REFRESH_MARGIN_SECS)
}

/// Keep cookie sessions alive: exchange the refresh token when the access
/// token is missing or about to expire.
pub async fn session_refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let has_bearer = request.headers().contains_key(header::AUTHORIZATION);
    if has_bearer || !needs_refresh(&jar, Utc::now().timestamp()) {
        return next.run(request).await;
    }

    let refresh_token = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .unwrap_or_default();
    let secure = state.config.is_production();

    match state.identity.refresh_session(&refresh_token).await {
        Ok(session) => {
            debug!("Refreshed session from cookie");
            request
                .extensions_mut()
                .insert(RefreshedAccessToken(Some(session.access_token.clone())));
            let response = next.run(request).await;
            (set_session_cookies(jar, &session, secure), response).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Session refresh failed, clearing cookies");
            request.extensions_mut().insert(RefreshedAccessToken(None));
            let response = next.run(request).await;
            (clear_session_cookies(jar), response).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jar(cookies: &[(&'static str, &'static str)]) -> CookieJar {
        cookies
            .iter()
            .fold(CookieJar::new(), |jar, (k, v)| jar.add(Cookie::new(*k, *v)))
    }

    #[test]
    fn test_needs_refresh_rules() {
        let now = 10_000;
        assert!(!needs_refresh(&jar(&[]), now));
        assert!(!needs_refresh(&jar(&[(ACCESS_TOKEN_COOKIE, "a")]), now));
        assert!(needs_refresh(&jar(&[(REFRESH_TOKEN_COOKIE, "r")]), now));
        assert!(needs_refresh(
            &jar(&[
                (ACCESS_TOKEN_COOKIE, "a"),
                (REFRESH_TOKEN_COOKIE, "r"),
                (EXPIRES_AT_COOKIE, "10030"),
            ]),
            now
        ));
        assert!(!needs_refresh(
            &jar(&[
                (ACCESS_TOKEN_COOKIE, "a"),
                (REFRESH_TOKEN_COOKIE, "r"),
                (EXPIRES_AT_COOKIE, "20000"),
            ]),
            now
        ));
    }

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Bearer header-token")
            .header(header::COOKIE, format!("{}=cookie-token", ACCESS_TOKEN_COOKIE))
            .body(())
            .unwrap();
        let (parts, _) = request.into_parts();
        assert_eq!(access_token(&parts).as_deref(), Some("header-token"));
    }

    #[test]
    fn test_cookie_token_and_refresh_override() {
        let request = Request::builder()
            .header(header::COOKIE, format!("{}=cookie-token", ACCESS_TOKEN_COOKIE))
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        assert_eq!(access_token(&parts).as_deref(), Some("cookie-token"));

        parts.extensions.insert(RefreshedAccessToken(None));
        assert_eq!(access_token(&parts), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(ACCESS_TOKEN_COOKIE, "t".into(), true);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(true));
    }
}
