//! Job listing models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use crate::error::ModelError;

/// Store-assigned job identifier.
///
/// The store may hand out integer or text keys; both are carried as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Int(n) => Self(n.to_string()),
        })
    }
}

// Numeric ids order numerically and sort before non-numeric ids.
impl Ord for JobId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<u64>(), other.0.parse::<u64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for JobId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Employment type of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
pub enum JobType {
    #[serde(rename = "Full-Time")]
    FullTime,
    #[serde(rename = "Part-Time")]
    PartTime,
    #[serde(rename = "Contract")]
    Contract,
}

impl JobType {
    pub const ALL: [JobType; 3] = [JobType::FullTime, JobType::PartTime, JobType::Contract];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-Time",
            JobType::PartTime => "Part-Time",
            JobType::Contract => "Contract",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = ModelError;

    /// Case-insensitive; separators between words are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match folded.as_str() {
            "fulltime" => Ok(JobType::FullTime),
            "parttime" => Ok(JobType::PartTime),
            "contract" => Ok(JobType::Contract),
            _ => Err(ModelError::InvalidJobType(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for JobType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Job type filter for list queries; `All` applies no filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobTypeFilter {
    #[default]
    All,
    Only(JobType),
}

impl JobTypeFilter {
    pub fn job_type(&self) -> Option<JobType> {
        match self {
            JobTypeFilter::All => None,
            JobTypeFilter::Only(t) => Some(*t),
        }
    }

    pub fn matches(&self, job_type: Option<JobType>) -> bool {
        match self {
            JobTypeFilter::All => true,
            JobTypeFilter::Only(t) => job_type == Some(*t),
        }
    }
}

impl fmt::Display for JobTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobTypeFilter::All => f.write_str("All"),
            JobTypeFilter::Only(t) => t.fmt(f),
        }
    }
}

impl FromStr for JobTypeFilter {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(JobTypeFilter::All);
        }
        s.trim().parse().map(JobTypeFilter::Only)
    }
}

impl From<JobType> for JobTypeFilter {
    fn from(t: JobType) -> Self {
        JobTypeFilter::Only(t)
    }
}

/// Full job record as returned by detail lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub location: String,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub description: String,
    /// Owning company (profile id)
    pub company_id: String,
    /// Resolved from the owning profile
    #[serde(default)]
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Client-facing projection used in list responses.
    pub fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            location: self.location.clone(),
            job_type: self.job_type,
            company_name: self.company_name.clone(),
            created_at: self.created_at,
        }
    }

    pub fn is_owned_by(&self, profile_id: &str) -> bool {
        self.company_id == profile_id
    }
}

/// Flattened list entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JobSummary {
    pub id: JobId,
    pub title: String,
    pub location: String,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The mutable fields of a job, as submitted by the editor.
///
/// Unknown keys (such as a client-supplied `company_id`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, Validate)]
pub struct JobFields {
    #[validate(custom(function = non_blank, message = "title is required"))]
    #[serde(default)]
    pub title: String,

    #[validate(custom(function = non_blank, message = "location is required"))]
    #[serde(default)]
    pub location: String,

    #[serde(default, deserialize_with = "deserialize_optional_job_type")]
    #[schemars(with = "Option<JobType>")]
    pub job_type: Option<JobType>,

    #[validate(custom(function = non_blank, message = "description is required"))]
    #[serde(default)]
    pub description: String,
}

impl JobFields {
    /// Copy with surrounding whitespace removed from every text field.
    pub fn trimmed(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            location: self.location.trim().to_string(),
            job_type: self.job_type,
            description: self.description.trim().to_string(),
        }
    }
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Form selects send an empty string for "no type".
fn deserialize_optional_job_type<'de, D>(deserializer: D) -> Result<Option<JobType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Insert payload: editable fields plus the owning company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewJob {
    pub company_id: String,
    #[serde(flatten)]
    pub fields: JobFields,
}
