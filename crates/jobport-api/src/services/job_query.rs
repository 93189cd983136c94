//! Read side of job listings.

use std::sync::Arc;

use tracing::debug;

use jobport_models::{Job, JobId, JobListParams, JobPage};
use jobport_store::JobStore;

use crate::error::{ApiError, ApiResult};

/// Paginated, filtered reads over the job store.
#[derive(Clone)]
pub struct JobQueryService {
    jobs: Arc<dyn JobStore>,
}

impl JobQueryService {
    pub fn new(jobs: Arc<dyn JobStore>) -> Self {
        Self { jobs }
    }

    /// One page of summaries plus the page count for the same filters.
    pub async fn list(&self, params: &JobListParams) -> ApiResult<JobPage> {
        let listing = self.jobs.list_jobs(params).await?;
        let total_pages = params.page.total_pages(listing.total);

        debug!(
            page = params.page.page(),
            limit = params.page.limit(),
            total = listing.total,
            returned = listing.jobs.len(),
            "Listed jobs"
        );

        Ok(JobPage {
            jobs: listing.jobs.iter().map(|j| j.summary()).collect(),
            total_pages,
        })
    }

    pub async fn get(&self, id: &JobId) -> ApiResult<Job> {
        self.jobs
            .get_job(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Job {} not found", id)))
    }
}
