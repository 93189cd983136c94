//! Company profiles and authenticated principals.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Application-level company record, one per principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Profile {
    /// Same as the identity provider's principal id
    pub id: String,
    /// Company login name (the registration email)
    #[serde(alias = "email", default, deserialize_with = "null_as_empty")]
    pub username: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Identity attached to a request session, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Map<String, serde_json::Value>,
}

impl Principal {
    /// Company name attached at registration, if any.
    pub fn company_name(&self) -> Option<&str> {
        self.user_metadata
            .get("company_name")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}
