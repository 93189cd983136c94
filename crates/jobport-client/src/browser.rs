//! Paginated job list state behind the listing and "My Jobs" pages.

use tracing::warn;

use jobport_models::{JobId, JobListParams, JobSummary, JobTypeFilter, PageRequest, DEFAULT_LIMIT};

use crate::client::JobBoardClient;

pub const DELETE_FAILED: &str = "Failed to delete job";

pub struct JobBrowser {
    client: JobBoardClient,
    page: u32,
    limit: u32,
    search: String,
    job_type: JobTypeFilter,
    company_id: Option<String>,
    jobs: Vec<JobSummary>,
    total_pages: u32,
    loading: bool,
    error: Option<String>,
}

impl JobBrowser {
    pub fn new(client: JobBoardClient) -> Self {
        Self {
            client,
            page: 1,
            limit: DEFAULT_LIMIT,
            search: String::new(),
            job_type: JobTypeFilter::All,
            company_id: None,
            jobs: Vec::new(),
            total_pages: 0,
            loading: false,
            error: None,
        }
    }

    /// Only list jobs owned by `company_id`.
    pub fn for_company(client: JobBoardClient, company_id: impl Into<String>) -> Self {
        Self {
            company_id: Some(company_id.into()),
            ..Self::new(client)
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn jobs(&self) -> &[JobSummary] {
        &self.jobs
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn job_type(&self) -> JobTypeFilter {
        self.job_type
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn params(&self) -> JobListParams {
        let search = self.search.trim();
        JobListParams {
            page: PageRequest::new(self.page as i64, self.limit as i64),
            search: (!search.is_empty()).then(|| search.to_string()),
            job_type: self.job_type,
            company_id: self.company_id.clone(),
        }
    }

    /// Fetch the current page. A failed fetch keeps the rows already shown.
    pub async fn refresh(&mut self) {
        self.loading = true;
        match self.client.list_jobs(&self.params()).await {
            Ok(page) => {
                self.jobs = page.jobs;
                self.total_pages = page.total_pages;
                self.error = None;
            }
            Err(e) => {
                warn!(error = %e, page = self.page, "Failed to load jobs");
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
    }

    pub async fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.page = 1;
        self.refresh().await;
    }

    pub async fn set_job_type(&mut self, filter: JobTypeFilter) {
        self.job_type = filter;
        self.page = 1;
        self.refresh().await;
    }

    /// Returns whether the page changed.
    pub async fn next_page(&mut self) -> bool {
        if self.page >= self.total_pages {
            return false;
        }
        self.page += 1;
        self.refresh().await;
        true
    }

    pub async fn prev_page(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.page -= 1;
        self.refresh().await;
        true
    }

    /// Delete a listing, then reload the current page. Steps back to the new
    /// last page when the deleted row was the only one on the last page.
    pub async fn delete(&mut self, id: &JobId) -> bool {
        match self.client.delete_job(id).await {
            Ok(()) => {
                self.refresh().await;
                let last_page = self.total_pages.max(1);
                if self.error.is_none() && self.page > last_page {
                    self.page = last_page;
                    self.refresh().await;
                }
                true
            }
            Err(e) => {
                warn!(job_id = %id, error = %e, "Failed to delete job");
                self.error = Some(DELETE_FAILED.to_string());
                false
            }
        }
    }
}
