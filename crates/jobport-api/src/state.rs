//! Application state.

use std::sync::Arc;

use jobport_store::{JobRepository, JobStore, ProfileRepository, ProfileStore, StoreClient};

use crate::config::ApiConfig;
use crate::identity::{GoTrueClient, IdentityProvider};
use crate::services::{JobMutationService, JobQueryService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub jobs: Arc<dyn JobStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub job_query: JobQueryService,
    pub job_mutation: JobMutationService,
}

impl AppState {
    /// Create state backed by the hosted store and identity provider.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = StoreClient::from_env()?;
        let identity = GoTrueClient::from_env()?;

        Ok(Self::from_parts(
            config,
            Arc::new(JobRepository::new(store.clone())),
            Arc::new(ProfileRepository::new(store)),
            Arc::new(identity),
        ))
    }

    /// Assemble state from existing collaborators.
    pub fn from_parts(
        config: ApiConfig,
        jobs: Arc<dyn JobStore>,
        profiles: Arc<dyn ProfileStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            config,
            job_query: JobQueryService::new(Arc::clone(&jobs)),
            job_mutation: JobMutationService::new(Arc::clone(&jobs)),
            jobs,
            profiles,
            identity,
        }
    }
}
