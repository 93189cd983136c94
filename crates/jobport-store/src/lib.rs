//! Hosted store client for the Job Portal.
//!
//! This crate provides:
//! - A PostgREST-dialect REST client with tracing and metrics
//! - `JobStore` / `ProfileStore` traits consumed by the API
//! - REST-backed job and profile repositories
//! - An in-memory store and trait mocks behind the `test-support` feature

pub mod client;
pub mod error;
pub mod jobs_repo;
pub mod metrics;
pub mod ports;
pub mod profiles_repo;

#[cfg(any(test, feature = "test-support"))]
pub mod memory;

pub use client::{RestQuery, StoreClient, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use jobs_repo::JobRepository;
pub use ports::{JobListing, JobStore, ProfileStore};
pub use profiles_repo::ProfileRepository;

#[cfg(any(test, feature = "test-support"))]
pub use memory::InMemoryStore;

#[cfg(feature = "test-support")]
pub use ports::{MockJobStore, MockProfileStore};
