//! Uniform JSON response shapes.
//!
//! Success bodies are the payload itself, serialized with a status that
//! defaults to 200. Every failure uses one body, `{error, code, details?}`.

use std::borrow::Cow;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// A successful response.
#[derive(Debug)]
pub struct Envelope<T> {
    status: StatusCode,
    data: T,
}

/// Wrap `data` as a 200 response.
pub fn ok<T: Serialize>(data: T) -> Envelope<T> {
    Envelope {
        status: StatusCode::OK,
        data,
    }
}

impl<T> Envelope<T> {
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn data(&self) -> &T {
        &self.data
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.data)).into_response()
    }
}

/// Error body shared by every failing route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// A failure response under construction.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    code: Option<Cow<'static, str>>,
    message: String,
    details: Option<serde_json::Value>,
}

/// Build an error envelope; status defaults to 400.
pub fn fail(message: impl Into<String>) -> Failure {
    Failure {
        status: StatusCode::BAD_REQUEST,
        code: None,
        message: message.into(),
        details: None,
    }
}

impl Failure {
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Machine-readable code; derived from the status when not set.
    pub fn code(mut self, code: impl Into<Cow<'static, str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn details(mut self, details: Option<serde_json::Value>) -> Self {
        self.details = details;
        self
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.message.clone(),
            code: self
                .code
                .clone()
                .unwrap_or_else(|| Cow::Borrowed(code_for_status(self.status)))
                .into_owned(),
            details: self.details.clone(),
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = self.body();
        (self.status, Json(body)).into_response()
    }
}

fn code_for_status(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED => "unauthenticated",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::TOO_MANY_REQUESTS => "rate_limited",
        s if s.is_server_error() => "internal",
        _ => "validation_error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_defaults_to_200() {
        let envelope = ok(serde_json::json!({"success": true}));
        assert_eq!(envelope.status(), StatusCode::OK);
        assert_eq!(
            envelope.with_status(StatusCode::CREATED).status(),
            StatusCode::CREATED
        );
    }

    #[test]
    fn test_fail_defaults() {
        let failure = fail("title is required");
        let body = failure.body();
        assert_eq!(body.code, "validation_error");
        assert_eq!(body.error, "title is required");
        assert!(body.details.is_none());
        assert_eq!(fail("x").status(StatusCode::NOT_FOUND).body().code, "not_found");
    }

    #[test]
    fn test_error_body_omits_empty_details() {
        let value = serde_json::to_value(fail("nope").code("forbidden").body()).unwrap();
        assert_eq!(value, serde_json::json!({"error": "nope", "code": "forbidden"}));
    }
}
