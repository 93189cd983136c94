//! GoTrue client against a mock identity server.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jobport_api::identity::{IdentityConfig, IdentityError, MagicLinkRequest};
use jobport_api::{GoTrueClient, IdentityProvider};

async fn client(server: &MockServer) -> GoTrueClient {
    GoTrueClient::new(IdentityConfig::new(server.uri(), "anon-key")).unwrap()
}

fn session_json() -> serde_json::Value {
    json!({
        "access_token": "access-1",
        "token_type": "bearer",
        "refresh_token": "refresh-1",
        "expires_in": 3600,
        "expires_at": 1_900_000_000,
        "user": {
            "id": "user-1",
            "email": "team@acme.com",
            "aud": "authenticated",
            "user_metadata": { "company_name": "Acme" }
        }
    })
}

#[tokio::test]
async fn test_get_user_returns_principal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-1",
            "email": "team@acme.com",
            "role": "authenticated",
            "user_metadata": { "company_name": "Acme" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let principal = client(&server)
        .await
        .get_user("access-1")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(principal.id, "user-1");
    assert_eq!(principal.email.as_deref(), Some("team@acme.com"));
    assert_eq!(principal.company_name(), Some("Acme"));
}

#[tokio::test]
async fn test_get_user_rejected_token_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "msg": "invalid JWT" })),
        )
        .mount(&server)
        .await;

    let principal = client(&server).await.get_user("expired").await.unwrap();

    assert!(principal.is_none());
}

#[tokio::test]
async fn test_get_user_server_error_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server).await.get_user("token").await.unwrap_err();

    assert!(matches!(err, IdentityError::Provider { status: 500, .. }));
}

#[tokio::test]
async fn test_send_magic_link_posts_pkce_otp() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/otp"))
        .and(query_param("redirect_to", "http://jobs.test/auth/callback?next=/job"))
        .and(header("apikey", "anon-key"))
        .and(body_json(json!({
            "email": "team@acme.com",
            "create_user": false,
            "code_challenge": "challenge",
            "code_challenge_method": "s256"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let request = MagicLinkRequest {
        email: "team@acme.com".into(),
        create_user: false,
        data: None,
        redirect_to: "http://jobs.test/auth/callback?next=/job".into(),
        code_challenge: "challenge".into(),
    };

    client(&server)
        .await
        .send_magic_link(&request)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_magic_link_surfaces_provider_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/otp"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(json!({ "msg": "Email rate limit exceeded" })),
        )
        .mount(&server)
        .await;

    let request = MagicLinkRequest {
        email: "new@initech.com".into(),
        create_user: true,
        data: Some(json!({ "company_name": "Initech" })),
        redirect_to: "http://jobs.test/auth/callback?next=/".into(),
        code_challenge: "challenge".into(),
    };

    let err = client(&server)
        .await
        .send_magic_link(&request)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Email rate limit exceeded");
}

#[tokio::test]
async fn test_exchange_code_uses_pkce_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "pkce"))
        .and(body_json(json!({ "auth_code": "code-1", "code_verifier": "verifier-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json()))
        .expect(1)
        .mount(&server)
        .await;

    let session = client(&server)
        .await
        .exchange_code("code-1", "verifier-1")
        .await
        .unwrap();

    assert_eq!(session.access_token, "access-1");
    assert_eq!(session.refresh_token, "refresh-1");
    assert_eq!(session.expires_at_or(0), 1_900_000_000);
    assert_eq!(session.user.unwrap().id, "user-1");
}

#[tokio::test]
async fn test_refresh_session_uses_refresh_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(json!({ "refresh_token": "refresh-0" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json()))
        .expect(1)
        .mount(&server)
        .await;

    let session = client(&server)
        .await
        .refresh_session("refresh-0")
        .await
        .unwrap();

    assert_eq!(session.access_token, "access-1");
}

#[tokio::test]
async fn test_sign_out_revokes_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).await.sign_out("access-1").await.unwrap();
}
