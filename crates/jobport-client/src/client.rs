//! Typed HTTP client for the Job Portal API.

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, Instrument};
use url::Url;

use jobport_models::{Job, JobFields, JobId, JobListParams, JobPage, Profile};

use crate::error::{ClientError, ClientResult};

#[derive(Deserialize)]
struct MeBody {
    user: Option<Profile>,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    company: &'a str,
    email: &'a str,
}

/// API client with an optional bearer token.
#[derive(Clone)]
pub struct JobBoardClient {
    http: Client,
    base_url: String,
    access_token: Option<String>,
}

impl JobBoardClient {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let parsed = Url::parse(base_url)?;

        // Sign-out answers with a redirect meant for browsers
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("jobport-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            access_token: None,
        })
    }

    /// Send `token` as a bearer header on every request.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(header::ACCEPT, "application/json");
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn job_path(id: &JobId) -> String {
        format!("/jobs/{}", urlencoding::encode(id.as_str()))
    }

    // =========================================================================
    // Jobs
    // =========================================================================

    /// `GET /jobs`
    pub async fn list_jobs(&self, params: &JobListParams) -> ClientResult<JobPage> {
        let request = self.request(Method::GET, "/jobs").query(&params.to_query());
        self.send("list_jobs", request).await
    }

    /// `GET /jobs/:id`
    pub async fn get_job(&self, id: &JobId) -> ClientResult<Job> {
        let request = self.request(Method::GET, &Self::job_path(id));
        self.send("get_job", request).await
    }

    /// `POST /jobs`
    pub async fn create_job(&self, fields: &JobFields) -> ClientResult<Vec<Job>> {
        let request = self.request(Method::POST, "/jobs").json(fields);
        self.send("create_job", request).await
    }

    /// `PUT /jobs/:id`
    pub async fn update_job(&self, id: &JobId, fields: &JobFields) -> ClientResult<Job> {
        let request = self.request(Method::PUT, &Self::job_path(id)).json(fields);
        self.send("update_job", request).await
    }

    /// `DELETE /jobs/:id`
    pub async fn delete_job(&self, id: &JobId) -> ClientResult<()> {
        let request = self.request(Method::DELETE, &Self::job_path(id));
        self.send::<serde_json::Value>("delete_job", request)
            .await
            .map(|_| ())
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// The signed-in company profile, `None` without a session.
    pub async fn me(&self) -> ClientResult<Option<Profile>> {
        let request = self.request(Method::GET, "/auth/me");
        let body: MeBody = self.send("me", request).await?;
        Ok(body.user)
    }

    /// Request a sign-in link for an existing company. Returns the
    /// confirmation message.
    pub async fn login(&self, email: &str) -> ClientResult<String> {
        let request = self
            .request(Method::POST, "/auth/login")
            .json(&LoginBody { email });
        let body: MessageBody = self.send("login", request).await?;
        Ok(body.message)
    }

    /// Request a sign-up link for a new company.
    pub async fn register(&self, company: &str, email: &str) -> ClientResult<String> {
        let request = self
            .request(Method::POST, "/auth/register")
            .json(&RegisterBody { company, email });
        let body: MessageBody = self.send("register", request).await?;
        Ok(body.message)
    }

    /// End the session. The redirect the API answers with counts as success.
    pub async fn sign_out(&self) -> ClientResult<()> {
        let operation = "sign_out";
        async {
            let response = self.request(Method::POST, "/auth/signout").send().await?;
            let status = response.status();
            if status.is_success() || status.is_redirection() {
                return Ok(());
            }
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::from_response_body(status.as_u16(), &body))
        }
        .instrument(info_span!("api_request", operation = %operation))
        .await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> ClientResult<T> {
        async {
            let response = request.send().await?;
            let status = response.status();
            debug!(status = %status, "API response");

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ClientError::from_response_body(status.as_u16(), &body));
            }

            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        }
        .instrument(info_span!("api_request", operation = %operation))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(matches!(
            JobBoardClient::new("not a url"),
            Err(ClientError::Url(_))
        ));
    }

    #[test]
    fn test_job_path_is_encoded() {
        assert_eq!(JobBoardClient::job_path(&JobId::from("42")), "/jobs/42");
        assert_eq!(JobBoardClient::job_path(&JobId::from("a/b c")), "/jobs/a%2Fb%20c");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = JobBoardClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url, "http://localhost:8000");
        assert_eq!(client.access_token(), None);
        let client = client.with_access_token("t");
        assert_eq!(client.access_token(), Some("t"));
    }
}
