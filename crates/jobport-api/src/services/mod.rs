//! Business logic services.

pub mod job_mutation;
pub mod job_query;

pub use job_mutation::JobMutationService;
pub use job_query::JobQueryService;
