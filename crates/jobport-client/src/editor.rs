//! Create/edit form state for a single job.

use tracing::{info, warn};
use validator::Validate;

use jobport_models::{Job, JobFields, JobId, JobType};

use crate::client::JobBoardClient;
use crate::error::ClientResult;

pub const LOGIN_PATH: &str = "/login";
pub const AFTER_SAVE_PATH: &str = "/job";
pub const SAVE_FAILED: &str = "Failed to save job";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(JobId),
}

/// Outcome of opening the editor.
pub enum EditorGate {
    Ready(JobEditor),
    /// No signed-in company; send the visitor here.
    RedirectToLogin(&'static str),
}

/// A successfully saved job and where to go next.
#[derive(Debug, Clone, PartialEq)]
pub struct Saved {
    pub job: Job,
    pub redirect: &'static str,
}

pub struct JobEditor {
    client: JobBoardClient,
    mode: EditorMode,
    pub form: JobFields,
    error: Option<String>,
    submitting: bool,
}

impl JobEditor {
    /// Open a blank editor for the signed-in company.
    pub async fn open(client: JobBoardClient) -> ClientResult<EditorGate> {
        if !signed_in(&client).await? {
            return Ok(EditorGate::RedirectToLogin(LOGIN_PATH));
        }

        let form = JobFields {
            job_type: Some(JobType::FullTime),
            ..JobFields::default()
        };
        Ok(EditorGate::Ready(Self::with_form(client, EditorMode::Create, form)))
    }

    /// Open an editor pre-filled from an existing job.
    pub async fn edit(client: JobBoardClient, id: &JobId) -> ClientResult<EditorGate> {
        if !signed_in(&client).await? {
            return Ok(EditorGate::RedirectToLogin(LOGIN_PATH));
        }

        let job = client.get_job(id).await?;
        let form = JobFields {
            title: job.title,
            location: job.location,
            job_type: job.job_type,
            description: job.description,
        };
        Ok(EditorGate::Ready(Self::with_form(
            client,
            EditorMode::Edit(id.clone()),
            form,
        )))
    }

    fn with_form(client: JobBoardClient, mode: EditorMode, form: JobFields) -> Self {
        Self {
            client,
            mode,
            form,
            error: None,
            submitting: false,
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Validate and save. On failure the form is left as typed.
    pub async fn submit(&mut self) -> Option<Saved> {
        let fields = self.form.trimmed();
        if fields.validate().is_err() {
            self.error = Some(SAVE_FAILED.to_string());
            return None;
        }

        self.submitting = true;
        let result = match &self.mode {
            EditorMode::Create => self
                .client
                .create_job(&fields)
                .await
                .map(|jobs| jobs.into_iter().next()),
            EditorMode::Edit(id) => self.client.update_job(id, &fields).await.map(Some),
        };
        self.submitting = false;

        match result {
            Ok(Some(job)) => {
                info!(job_id = %job.id, "Job saved");
                self.error = None;
                Some(Saved {
                    job,
                    redirect: AFTER_SAVE_PATH,
                })
            }
            Ok(None) => {
                warn!("Save returned no job");
                self.error = Some(SAVE_FAILED.to_string());
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to save job");
                self.error = Some(SAVE_FAILED.to_string());
                None
            }
        }
    }
}

async fn signed_in(client: &JobBoardClient) -> ClientResult<bool> {
    match client.me().await {
        Ok(user) => Ok(user.is_some()),
        Err(e) if e.is_unauthenticated() => Ok(false),
        Err(e) => Err(e),
    }
}
