//! Magic-link authentication handlers.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::{Validate, ValidationError};

use jobport_models::Profile;

use crate::envelope::{ok, Envelope};
use crate::error::{ApiError, ApiResult};
use crate::identity::{code_challenge, generate_code_verifier, MagicLinkRequest};
use crate::metrics::record_magic_link;
use crate::session::{
    clear_code_verifier, clear_session_cookies, code_verifier_cookie, set_session_cookies,
    Session, CODE_VERIFIER_COOKIE,
};
use crate::state::AppState;

const DEFAULT_NEXT: &str = "/dashboard";
const LOGIN_PATH: &str = "/login";

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(custom(function = non_blank))]
    pub company: String,
    #[serde(default)]
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: Option<Profile>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub next: Option<String>,
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Only same-site paths are followed after sign-in.
fn safe_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        None | Some("") => DEFAULT_NEXT.to_string(),
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        Some(_) => "/".to_string(),
    }
}

/// Send a PKCE magic link and stash the verifier in a cookie.
async fn send_magic_link(
    state: &AppState,
    jar: CookieJar,
    email: String,
    create_user: bool,
    data: Option<serde_json::Value>,
    next: &str,
) -> ApiResult<CookieJar> {
    let verifier = generate_code_verifier();
    let request = MagicLinkRequest {
        email,
        create_user,
        data,
        redirect_to: format!("{}/auth/callback?next={}", state.config.site_url, next),
        code_challenge: code_challenge(&verifier),
    };

    state.identity.send_magic_link(&request).await?;

    Ok(jar.add(code_verifier_cookie(verifier, state.config.is_production())))
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> ApiResult<(CookieJar, Envelope<MessageResponse>)> {
    body.validate()
        .map_err(|_| ApiError::validation("company and email are required"))?;

    let company = body.company.trim().to_string();
    let email = body.email.trim().to_string();

    let jar = send_magic_link(
        &state,
        jar,
        email,
        true,
        Some(serde_json::json!({ "company_name": company })),
        "/",
    )
    .await?;

    record_magic_link("register");
    info!(company = %company, "Registration magic link sent");

    Ok((
        jar,
        ok(MessageResponse {
            ok: true,
            message: "Check your email for the magic link.".to_string(),
        }),
    ))
}

/// `POST /auth/login`. The email doubles as the company username.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> ApiResult<(CookieJar, Envelope<MessageResponse>)> {
    let username = body.email.trim();
    if username.is_empty() {
        return Err(ApiError::validation("email is required"));
    }

    let profile = state
        .profiles
        .find_profile_by_username(username)
        .await?
        .ok_or_else(|| ApiError::profile_not_found("Company not found"))?;

    let jar = send_magic_link(&state, jar, profile.username.clone(), false, None, "/job").await?;

    record_magic_link("login");
    info!(company_id = %profile.id, "Login magic link sent");

    Ok((
        jar,
        ok(MessageResponse {
            ok: true,
            message: "Magic link sent to company email.".to_string(),
        }),
    ))
}

/// `GET /auth/callback`
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let next = safe_next(query.next.as_deref());

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return Redirect::to(&next).into_response();
    };

    let Some(verifier) = jar.get(CODE_VERIFIER_COOKIE).map(|c| c.value().to_string()) else {
        warn!("Auth callback without a code verifier cookie");
        return Redirect::to(LOGIN_PATH).into_response();
    };

    match state.identity.exchange_code(&code, &verifier).await {
        Ok(session) => {
            let jar = set_session_cookies(clear_code_verifier(jar), &session, state.config.is_production());
            info!(next = %next, "Session established from magic link");
            (jar, Redirect::to(&next)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Code exchange failed");
            (clear_code_verifier(jar), Redirect::to(LOGIN_PATH)).into_response()
        }
    }
}

/// `GET /auth/me`
pub async fn me(State(state): State<AppState>, session: Session) -> ApiResult<Envelope<MeResponse>> {
    let Some(principal) = session.current_principal().await? else {
        return Ok(ok(MeResponse { user: None }));
    };

    let profile = state
        .profiles
        .get_profile(&principal.id)
        .await?
        .ok_or_else(|| ApiError::profile_not_found("No company profile for this account"))?;

    Ok(ok(MeResponse {
        user: Some(profile),
    }))
}

/// `POST /auth/signout`
pub async fn sign_out(State(state): State<AppState>, session: Session, jar: CookieJar) -> Response {
    if let Some(token) = session.access_token() {
        if let Err(e) = state.identity.sign_out(token).await {
            warn!(error = %e, "Provider sign-out failed");
        }
    }

    (clear_session_cookies(jar), Redirect::to("/")).into_response()
}
