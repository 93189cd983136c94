//! REST-backed profile repository.

use async_trait::async_trait;

use jobport_models::Profile;

use crate::client::{RestQuery, StoreClient};
use crate::error::StoreResult;
use crate::ports::ProfileStore;

const TABLE: &str = "profiles";
const PROFILE_COLUMNS: &str = "id,username,company_name,full_name";

/// Repository for the `profiles` table. Rows are created by the store itself
/// on sign-up, so this side only reads.
#[derive(Clone)]
pub struct ProfileRepository {
    client: StoreClient,
}

impl ProfileRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    async fn find_one(&self, operation: &str, column: &str, value: &str) -> StoreResult<Option<Profile>> {
        let query = RestQuery::new()
            .select(PROFILE_COLUMNS)
            .eq(column, value)
            .limit(1);
        let rows = self.client.select::<Profile>(operation, TABLE, &query).await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn get_profile(&self, id: &str) -> StoreResult<Option<Profile>> {
        self.find_one("get_profile", "id", id).await
    }

    async fn find_profile_by_username(&self, username: &str) -> StoreResult<Option<Profile>> {
        self.find_one("find_profile_by_username", "username", username)
            .await
    }
}
