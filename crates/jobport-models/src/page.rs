//! Pagination and list-filter parameters.
//!
//! Raw query strings are parsed into [`JobListParams`], which carries
//! explicit defaults and bounds so the query layer never sees an
//! out-of-range page or limit.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::job::{JobSummary, JobTypeFilter};

/// Page size used when the request does not specify one.
pub const DEFAULT_LIMIT: u32 = 10;

/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 50;

/// A 1-based page number and a bounded page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Clamp `page` to at least 1 and `limit` into `[1, MAX_LIMIT]`.
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.clamp(1, u32::MAX as i64) as u32,
            limit: limit.clamp(1, MAX_LIMIT as i64) as u32,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Zero-based offset of the first row on this page.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Inclusive row window `[offset, offset + limit - 1]`.
    pub fn window(&self) -> (u64, u64) {
        let from = self.offset();
        (from, from + self.limit as u64 - 1)
    }

    /// `ceil(count / limit)`; zero rows means zero pages.
    pub fn total_pages(&self, count: u64) -> u32 {
        let limit = self.limit as u64;
        let pages = count.div_ceil(limit);
        pages.min(u32::MAX as u64) as u32
    }
}

/// Raw `GET /jobs` query string, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
}

/// Validated list parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobListParams {
    pub page: PageRequest,
    /// Case-insensitive substring matched against the job location
    pub search: Option<String>,
    pub job_type: JobTypeFilter,
    /// Restrict to jobs owned by this company
    pub company_id: Option<String>,
}

impl JobListParams {
    /// Parse a raw query, applying defaults and clamping bounds.
    pub fn parse(query: &JobListQuery) -> ModelResult<Self> {
        let page = parse_number("page", query.page.as_deref(), 1)?;
        let limit = parse_number("limit", query.limit.as_deref(), DEFAULT_LIMIT as i64)?;

        let job_type = match non_empty(query.job_type.as_deref()) {
            Some(raw) => raw
                .parse::<JobTypeFilter>()
                .map_err(|_| ModelError::invalid_parameter("job_type", raw))?,
            None => JobTypeFilter::All,
        };

        Ok(Self {
            page: PageRequest::new(page, limit),
            search: non_empty(query.search.as_deref()).map(str::to_string),
            job_type,
            company_id: non_empty(query.company_id.as_deref()).map(str::to_string),
        })
    }

    /// Render back into a query string representation.
    pub fn to_query(&self) -> JobListQuery {
        JobListQuery {
            page: Some(self.page.page().to_string()),
            limit: Some(self.page.limit().to_string()),
            search: self.search.clone(),
            job_type: match self.job_type {
                JobTypeFilter::All => None,
                filter => Some(filter.to_string()),
            },
            company_id: self.company_id.clone(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_number(name: &'static str, raw: Option<&str>, default: i64) -> ModelResult<i64> {
    match non_empty(raw) {
        None => Ok(default),
        Some(s) => s
            .parse::<i64>()
            .map_err(|_| ModelError::invalid_parameter(name, s)),
    }
}

/// One page of job summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPage {
    pub jobs: Vec<JobSummary>,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}
