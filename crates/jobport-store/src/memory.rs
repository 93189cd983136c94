//! In-memory store for tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use jobport_models::{Job, JobFields, JobId, JobListParams, NewJob, Profile};

use crate::error::StoreResult;
use crate::ports::{JobListing, JobStore, ProfileStore};

#[derive(Default)]
struct State {
    jobs: Vec<Job>,
    profiles: Vec<Profile>,
    next_id: u64,
}

/// Process-local implementation of [`JobStore`] and [`ProfileStore`] with the
/// same ordering and filter semantics as the REST repositories.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_profile(&self, profile: Profile) {
        self.state.write().await.profiles.push(profile);
    }

    /// Seed a job as-is, keeping its id and timestamp.
    pub async fn add_job(&self, job: Job) {
        let mut state = self.state.write().await;
        if let Ok(n) = job.id.as_str().parse::<u64>() {
            state.next_id = state.next_id.max(n);
        }
        state.jobs.push(job);
    }

    pub async fn jobs(&self) -> Vec<Job> {
        self.state.read().await.jobs.clone()
    }
}

fn matches(job: &Job, params: &JobListParams) -> bool {
    let location_ok = params.search.as_ref().map_or(true, |needle| {
        job.location
            .to_lowercase()
            .contains(&needle.to_lowercase())
    });
    let company_ok = params
        .company_id
        .as_ref()
        .map_or(true, |c| &job.company_id == c);

    location_ok && company_ok && params.job_type.matches(job.job_type)
}

#[async_trait]
impl JobStore for InMemoryStore {
    async fn list_jobs(&self, params: &JobListParams) -> StoreResult<JobListing> {
        let state = self.state.read().await;

        let mut matching: Vec<&Job> = state.jobs.iter().filter(|j| matches(j, params)).collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as u64;
        let jobs = matching
            .into_iter()
            .skip(params.page.offset() as usize)
            .take(params.page.limit() as usize)
            .cloned()
            .collect();

        Ok(JobListing { jobs, total })
    }

    async fn get_job(&self, id: &JobId) -> StoreResult<Option<Job>> {
        let state = self.state.read().await;
        Ok(state.jobs.iter().find(|j| &j.id == id).cloned())
    }

    async fn insert_job(&self, job: &NewJob) -> StoreResult<Vec<Job>> {
        let mut state = self.state.write().await;
        state.next_id += 1;

        let company_name = state
            .profiles
            .iter()
            .find(|p| p.id == job.company_id)
            .and_then(|p| p.company_name.clone());

        let stored = Job {
            id: JobId::from(state.next_id.to_string()),
            title: job.fields.title.clone(),
            location: job.fields.location.clone(),
            job_type: job.fields.job_type,
            description: job.fields.description.clone(),
            company_id: job.company_id.clone(),
            company_name,
            created_at: Utc::now(),
        };
        state.jobs.push(stored.clone());
        Ok(vec![stored])
    }

    async fn update_job(&self, id: &JobId, fields: &JobFields) -> StoreResult<Option<Job>> {
        let mut state = self.state.write().await;
        Ok(state.jobs.iter_mut().find(|j| &j.id == id).map(|job| {
            job.title = fields.title.clone();
            job.location = fields.location.clone();
            job.job_type = fields.job_type;
            job.description = fields.description.clone();
            job.clone()
        }))
    }

    async fn delete_job(&self, id: &JobId) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.jobs.len();
        state.jobs.retain(|j| &j.id != id);
        Ok(state.jobs.len() != before)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn get_profile(&self, id: &str) -> StoreResult<Option<Profile>> {
        let state = self.state.read().await;
        Ok(state.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn find_profile_by_username(&self, username: &str) -> StoreResult<Option<Profile>> {
        let state = self.state.read().await;
        Ok(state
            .profiles
            .iter()
            .find(|p| p.username == username)
            .cloned())
    }
}
