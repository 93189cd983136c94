//! REST-backed job repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use tracing::{info, warn};

use jobport_models::{Job, JobFields, JobId, JobListParams, JobType, NewJob};

use crate::client::{RestQuery, StoreClient};
use crate::error::StoreResult;
use crate::ports::{JobListing, JobStore};

const TABLE: &str = "jobs";

/// Job columns plus the owning company's name from the profiles relation.
const JOB_COLUMNS: &str =
    "id,title,location,job_type,description,company_id,created_at,profiles(company_name)";

const NEWEST_FIRST: &str = "created_at.desc,id.desc";

/// Repository for the `jobs` table.
#[derive(Clone)]
pub struct JobRepository {
    client: StoreClient,
}

impl JobRepository {
    /// Create a new job repository.
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    fn list_query(params: &JobListParams) -> RestQuery {
        let mut query = RestQuery::new().select(JOB_COLUMNS);

        if let Some(search) = &params.search {
            query = query.contains_ci("location", search);
        }
        if let Some(job_type) = params.job_type.job_type() {
            query = query.imatch("job_type", &job_type_pattern(job_type));
        }
        if let Some(company_id) = &params.company_id {
            query = query.eq("company_id", company_id);
        }

        query
            .order(NEWEST_FIRST)
            .offset(params.page.offset())
            .limit(params.page.limit() as u64)
    }

    fn by_id(id: &JobId) -> RestQuery {
        RestQuery::new().select(JOB_COLUMNS).eq("id", id.as_str())
    }
}

/// Anchored pattern accepting every spelling `JobType::from_str` accepts.
///
/// Stored rows mix `Full-Time`, `Full-time` and similar; any run of `-`, `_`
/// or space may sit between letters, in any case.
fn job_type_pattern(job_type: JobType) -> String {
    const SEP: &str = "[-_ ]*";
    let mut pattern = format!("^{SEP}");
    for c in job_type
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .flat_map(char::to_lowercase)
    {
        pattern.push(c);
        pattern.push_str(SEP);
    }
    pattern.push('$');
    pattern
}

#[async_trait]
impl JobStore for JobRepository {
    async fn list_jobs(&self, params: &JobListParams) -> StoreResult<JobListing> {
        let (rows, total) = self
            .client
            .select_counted::<JobRow>("list_jobs", TABLE, &Self::list_query(params))
            .await?;

        Ok(JobListing {
            jobs: rows.into_iter().map(Job::from).collect(),
            total,
        })
    }

    async fn get_job(&self, id: &JobId) -> StoreResult<Option<Job>> {
        let rows = self
            .client
            .select::<JobRow>("get_job", TABLE, &Self::by_id(id))
            .await?;
        Ok(rows.into_iter().next().map(Job::from))
    }

    async fn insert_job(&self, job: &NewJob) -> StoreResult<Vec<Job>> {
        let query = RestQuery::new().select(JOB_COLUMNS);
        let rows = self
            .client
            .insert::<JobRow, _>("insert_job", TABLE, &query, std::slice::from_ref(job))
            .await?;

        let jobs: Vec<Job> = rows.into_iter().map(Job::from).collect();
        info!(company_id = %job.company_id, count = jobs.len(), "Inserted job");
        Ok(jobs)
    }

    async fn update_job(&self, id: &JobId, fields: &JobFields) -> StoreResult<Option<Job>> {
        let rows = self
            .client
            .update::<JobRow, _>("update_job", TABLE, &Self::by_id(id), fields)
            .await?;
        Ok(rows.into_iter().next().map(Job::from))
    }

    async fn delete_job(&self, id: &JobId) -> StoreResult<bool> {
        let query = RestQuery::new().select("id").eq("id", id.as_str());
        let rows = self
            .client
            .delete::<serde_json::Value>("delete_job", TABLE, &query)
            .await?;
        Ok(!rows.is_empty())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client.ping(TABLE).await
    }
}

// =============================================================================
// Row mapping
// =============================================================================

#[derive(Debug, Deserialize)]
struct JobRow {
    id: JobId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default, deserialize_with = "lenient_job_type")]
    job_type: Option<JobType>,
    #[serde(default)]
    description: Option<String>,
    company_id: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    profiles: Option<CompanyRef>,
}

#[derive(Debug, Deserialize)]
struct CompanyRef {
    #[serde(default)]
    company_name: Option<String>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Job {
            id: row.id,
            title: row.title.unwrap_or_default(),
            location: row.location.unwrap_or_default(),
            job_type: row.job_type,
            description: row.description.unwrap_or_default(),
            company_id: row.company_id,
            company_name: row.profiles.and_then(|p| p.company_name),
            created_at: row.created_at,
        }
    }
}

/// Legacy rows may carry free-form types; those read back as untyped.
fn lenient_job_type<'de, D>(deserializer: D) -> Result<Option<JobType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.parse() {
        Ok(t) => Some(t),
        Err(_) => {
            if !s.trim().is_empty() {
                warn!(job_type = %s, "Ignoring unrecognised job type on stored row");
            }
            None
        }
    }))
}
