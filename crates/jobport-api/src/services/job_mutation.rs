//! Write side of job listings.
//!
//! Every operation resolves the caller's company profile first. Ownership is
//! checked against the stored row before update and delete; the owning
//! company of a job never changes after insert.

use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use jobport_models::{Job, JobFields, JobId, NewJob, Profile};
use jobport_store::JobStore;

use crate::error::{ApiError, ApiResult};
use crate::metrics::record_job_mutation;
use crate::session::Session;

#[derive(Clone)]
pub struct JobMutationService {
    jobs: Arc<dyn JobStore>,
}

impl JobMutationService {
    pub fn new(jobs: Arc<dyn JobStore>) -> Self {
        Self { jobs }
    }

    /// Insert a job owned by the caller's company.
    pub async fn create(&self, session: &Session, fields: JobFields) -> ApiResult<Vec<Job>> {
        let result = self.try_create(session, fields).await;
        record_job_mutation("create", outcome(&result));
        result
    }

    /// Replace the editable fields of a job the caller owns.
    pub async fn update(&self, session: &Session, id: &JobId, fields: JobFields) -> ApiResult<Job> {
        let result = self.try_update(session, id, fields).await;
        record_job_mutation("update", outcome(&result));
        result
    }

    /// Remove a job the caller owns.
    pub async fn delete(&self, session: &Session, id: &JobId) -> ApiResult<()> {
        let result = self.try_delete(session, id).await;
        record_job_mutation("delete", outcome(&result));
        result
    }

    async fn try_create(&self, session: &Session, fields: JobFields) -> ApiResult<Vec<Job>> {
        let profile = session.current_profile().await?;
        let fields = validated(fields)?;

        let new_job = NewJob {
            company_id: profile.id.clone(),
            fields,
        };
        let created = self.jobs.insert_job(&new_job).await?;

        info!(company_id = %profile.id, count = created.len(), "Job created");
        Ok(created)
    }

    async fn try_update(&self, session: &Session, id: &JobId, fields: JobFields) -> ApiResult<Job> {
        let profile = session.current_profile().await?;
        let fields = validated(fields)?;
        self.owned_job(&profile, id).await?;

        let updated = self
            .jobs
            .update_job(id, &fields)
            .await?
            .ok_or_else(|| not_found(id))?;

        info!(job_id = %id, company_id = %profile.id, "Job updated");
        Ok(updated)
    }

    async fn try_delete(&self, session: &Session, id: &JobId) -> ApiResult<()> {
        let profile = session.current_profile().await?;
        self.owned_job(&profile, id).await?;

        if !self.jobs.delete_job(id).await? {
            return Err(not_found(id));
        }

        info!(job_id = %id, company_id = %profile.id, "Job deleted");
        Ok(())
    }

    async fn owned_job(&self, profile: &Profile, id: &JobId) -> ApiResult<Job> {
        let job = self.jobs.get_job(id).await?.ok_or_else(|| not_found(id))?;

        if !job.is_owned_by(&profile.id) {
            warn!(job_id = %id, company_id = %profile.id, owner = %job.company_id, "Rejected mutation by non-owner");
            return Err(ApiError::forbidden("You do not own this job"));
        }
        Ok(job)
    }
}

fn validated(fields: JobFields) -> ApiResult<JobFields> {
    let fields = fields.trimmed();
    fields.validate()?;
    Ok(fields)
}

fn not_found(id: &JobId) -> ApiError {
    ApiError::not_found(format!("Job {} not found", id))
}

fn outcome<T>(result: &ApiResult<T>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(e) => e.code(),
    }
}
