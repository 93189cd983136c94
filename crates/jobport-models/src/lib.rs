//! Shared data models for the Job Portal backend.
//!
//! This crate provides Serde-serializable types for:
//! - Job listings, summaries and editable fields
//! - Company profiles and authenticated principals
//! - Typed pagination and list-filter parameters

pub mod error;
pub mod job;
pub mod page;
pub mod profile;

// Re-export common types
pub use error::{ModelError, ModelResult};
pub use job::{Job, JobFields, JobId, JobSummary, JobType, JobTypeFilter, NewJob};
pub use page::{JobListParams, JobListQuery, JobPage, PageRequest, DEFAULT_LIMIT, MAX_LIMIT};
pub use profile::{Principal, Profile};
