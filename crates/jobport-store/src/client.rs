//! Hosted store REST client.
//!
//! Speaks the PostgREST dialect over HTTPS:
//! - Service-key authentication (`apikey` + bearer headers)
//! - HTTP client tuning (pooling, timeouts)
//! - Exact counts parsed from `Content-Range`
//! - Observability (tracing spans, metrics)
//!
//! Requests are never retried; a failure surfaces to the caller as-is.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info_span, Instrument};

use crate::error::{StoreError, StoreResult};
use crate::metrics::record_request;

// =============================================================================
// Configuration
// =============================================================================

/// Store client configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Service key sent as `apikey` and bearer token
    pub service_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_key: service_key.into(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        let url = first_env(&["STORE_URL", "SUPABASE_URL"]).ok_or_else(|| {
            StoreError::config("STORE_URL or SUPABASE_URL must be set to reach the store")
        })?;

        let service_key = first_env(&[
            "STORE_SERVICE_KEY",
            "SUPABASE_SERVICE_ROLE_KEY",
            "SUPABASE_ANON_KEY",
        ])
        .ok_or_else(|| {
            StoreError::config(
                "STORE_SERVICE_KEY, SUPABASE_SERVICE_ROLE_KEY or SUPABASE_ANON_KEY must be set",
            )
        })?;

        let timeout_secs: u64 = std::env::var("STORE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let connect_timeout_secs: u64 = std::env::var("STORE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            url,
            service_key,
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        })
    }
}

fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| std::env::var(k).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

// =============================================================================
// Query builder
// =============================================================================

/// PostgREST query-string parameters for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestQuery {
    params: Vec<(String, String)>,
}

impl RestQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns to return, including embedded relations.
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".into(), columns.into()));
        self
    }

    /// `column=eq.value`
    pub fn eq(mut self, column: &str, value: impl AsRef<str>) -> Self {
        self.params
            .push((column.into(), format!("eq.{}", value.as_ref())));
        self
    }

    /// `column=imatch.pattern`, a case-insensitive POSIX regex match.
    pub fn imatch(mut self, column: &str, pattern: &str) -> Self {
        self.params
            .push((column.into(), format!("imatch.{}", pattern)));
        self
    }

    /// Case-insensitive substring match; the needle is matched literally.
    ///
    /// PostgREST reads every `*` in an `ilike` value as `%`, so this uses `imatch`.
    pub fn contains_ci(self, column: &str, needle: &str) -> Self {
        self.imatch(column, &escape_regex(needle))
    }

    /// Comma-separated ordering, e.g. `created_at.desc,id.desc`.
    pub fn order(mut self, order: &str) -> Self {
        self.params.push(("order".into(), order.into()));
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.params.push(("offset".into(), offset.to_string()));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.params.push(("limit".into(), limit.to_string()));
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Escape POSIX regex metacharacters so user input matches literally.
pub fn escape_regex(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '\\' | '.' | '^' | '$' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Total row count from a `Content-Range` header (`0-9/42`, `*/42`).
///
/// Returns `None` when the total is unknown (`*/*`) or the header is malformed.
pub fn parse_content_range(value: &str) -> Option<u64> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.parse().ok()
}

// =============================================================================
// Client
// =============================================================================

/// Hosted store REST client.
#[derive(Clone)]
pub struct StoreClient {
    http: Client,
    config: Arc<StoreConfig>,
    rest_url: String,
}

impl StoreClient {
    /// Create a new store client.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("jobport-store/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StoreError::Network)?;

        let rest_url = format!("{}/rest/v1", config.url.trim_end_matches('/'));

        Ok(Self {
            http,
            config: Arc::new(config),
            rest_url,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::new(StoreConfig::from_env()?)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    fn request(&self, method: Method, table: &str, query: &RestQuery) -> RequestBuilder {
        self.http
            .request(method, self.table_url(table))
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
            .query(query.params())
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Fetch matching rows.
    pub async fn select<T: DeserializeOwned>(
        &self,
        operation: &str,
        table: &str,
        query: &RestQuery,
    ) -> StoreResult<Vec<T>> {
        self.execute_request(operation, table, async {
            let response = self.request(Method::GET, table, query).send().await?;
            Self::read_rows(response, table).await
        })
        .await
    }

    /// Fetch matching rows plus the exact count of all rows matching the
    /// filters, independent of `offset`/`limit`.
    pub async fn select_counted<T: DeserializeOwned>(
        &self,
        operation: &str,
        table: &str,
        query: &RestQuery,
    ) -> StoreResult<(Vec<T>, u64)> {
        self.execute_request(operation, table, async {
            let response = self
                .request(Method::GET, table, query)
                .header("Prefer", "count=exact")
                .send()
                .await?;

            let total = response
                .headers()
                .get(header::CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_content_range);

            // Offset past the last row.
            if response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
                debug!(table, "Requested range past end of result set");
                return Ok((Vec::new(), total.unwrap_or(0)));
            }

            let rows: Vec<T> = Self::read_rows(response, table).await?;
            let total = total.unwrap_or(rows.len() as u64);
            Ok((rows, total))
        })
        .await
    }

    /// Insert rows and return them as stored.
    pub async fn insert<T, B>(
        &self,
        operation: &str,
        table: &str,
        query: &RestQuery,
        rows: &[B],
    ) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        self.execute_request(operation, table, async {
            let response = self
                .request(Method::POST, table, query)
                .header("Prefer", "return=representation")
                .json(rows)
                .send()
                .await?;
            Self::read_rows(response, table).await
        })
        .await
    }

    /// Patch matching rows and return them as stored. An empty result means
    /// nothing matched.
    pub async fn update<T, B>(
        &self,
        operation: &str,
        table: &str,
        query: &RestQuery,
        patch: &B,
    ) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        self.execute_request(operation, table, async {
            let response = self
                .request(Method::PATCH, table, query)
                .header("Prefer", "return=representation")
                .json(patch)
                .send()
                .await?;
            Self::read_rows(response, table).await
        })
        .await
    }

    /// Delete matching rows and return what was removed.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        operation: &str,
        table: &str,
        query: &RestQuery,
    ) -> StoreResult<Vec<T>> {
        self.execute_request(operation, table, async {
            let response = self
                .request(Method::DELETE, table, query)
                .header("Prefer", "return=representation")
                .send()
                .await?;
            Self::read_rows(response, table).await
        })
        .await
    }

    /// Cheap reachability probe used by readiness checks.
    pub async fn ping(&self, table: &str) -> StoreResult<()> {
        let query = RestQuery::new().select("id").limit(1);
        self.execute_request("ping", table, async {
            let response = self.request(Method::GET, table, &query).send().await?;
            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(Self::handle_error_response(status, table, response).await)
            }
        })
        .await
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    async fn read_rows<T: DeserializeOwned>(
        response: reqwest::Response,
        table: &str,
    ) -> StoreResult<Vec<T>> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, table, response).await);
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            StoreError::invalid_response(format!(
                "Failed to parse {} rows: {} (body prefix: {})",
                table,
                e,
                body.chars().take(200).collect::<String>()
            ))
        })
    }

    /// Execute a request with tracing and metrics.
    async fn execute_request<T, F>(&self, operation: &str, table: &str, fut: F) -> StoreResult<T>
    where
        F: std::future::Future<Output = StoreResult<T>>,
    {
        let span = info_span!("store_request", operation = %operation, table = %table);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, table, status, latency_ms);

        result
    }

    async fn handle_error_response(
        status: StatusCode,
        table: &str,
        response: reqwest::Response,
    ) -> StoreError {
        let body = response.text().await.unwrap_or_default();
        StoreError::from_http_status(status.as_u16(), format!("{} failed: {}", table, body))
    }
}

// =============================================================================
// Tests
// =============================================================================
