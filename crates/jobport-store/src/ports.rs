//! Storage traits consumed by the API services.
//!
//! The REST repositories and the in-memory store both implement these, so
//! handlers and services depend only on the traits.

use async_trait::async_trait;

use jobport_models::{Job, JobFields, JobId, JobListParams, NewJob, Profile};

use crate::error::StoreResult;

/// A window of jobs plus the count of every job matching the filters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobListing {
    pub jobs: Vec<Job>,
    pub total: u64,
}

/// Access to job listings.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Filtered page, newest first with ties broken by id descending.
    async fn list_jobs(&self, params: &JobListParams) -> StoreResult<JobListing>;

    async fn get_job(&self, id: &JobId) -> StoreResult<Option<Job>>;

    /// Insert and return the stored rows.
    async fn insert_job(&self, job: &NewJob) -> StoreResult<Vec<Job>>;

    /// Replace the mutable fields; `None` when no row has this id.
    async fn update_job(&self, id: &JobId, fields: &JobFields) -> StoreResult<Option<Job>>;

    /// `true` when a row was removed.
    async fn delete_job(&self, id: &JobId) -> StoreResult<bool>;

    /// Reachability probe for readiness checks.
    async fn ping(&self) -> StoreResult<()>;
}

/// Read access to company profiles.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, id: &str) -> StoreResult<Option<Profile>>;

    async fn find_profile_by_username(&self, username: &str) -> StoreResult<Option<Profile>>;
}
