//! Axum HTTP API server for the Job Portal.
//!
//! This crate provides:
//! - Paginated job search and owner-scoped job mutation
//! - Magic-link sign-in through the hosted identity provider
//! - A uniform `{error, code, details?}` error envelope
//! - Rate limiting, security headers and Prometheus metrics

pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;

pub use config::ApiConfig;
pub use envelope::{fail, ok, Envelope, ErrorBody};
pub use error::{ApiError, ApiResult};
pub use identity::{AuthSession, GoTrueClient, IdentityConfig, IdentityError, IdentityProvider};
pub use routes::create_router;
pub use services::{JobMutationService, JobQueryService};
pub use session::Session;
pub use state::AppState;
