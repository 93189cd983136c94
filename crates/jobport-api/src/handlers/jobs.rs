//! Job listing handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::Serialize;

use jobport_models::{Job, JobFields, JobId, JobListParams, JobListQuery, JobPage};

use crate::envelope::{ok, Envelope};
use crate::error::{ApiError, ApiResult};
use crate::session::Session;
use crate::state::AppState;

/// Body returned by a successful delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// `GET /jobs`
pub async fn list_jobs(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<JobListQuery>, ApiError>,
) -> ApiResult<Envelope<JobPage>> {
    let params = JobListParams::parse(&query)?;
    let page = state.job_query.list(&params).await?;
    Ok(ok(page))
}

/// `GET /jobs/:id`
pub async fn get_job(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<String>, ApiError>,
) -> ApiResult<Envelope<Job>> {
    let job = state.job_query.get(&JobId::from(id)).await?;
    Ok(ok(job))
}

/// `POST /jobs`
pub async fn create_job(
    State(state): State<AppState>,
    session: Session,
    WithRejection(Json(fields), _): WithRejection<Json<JobFields>, ApiError>,
) -> ApiResult<Envelope<Vec<Job>>> {
    let created = state.job_mutation.create(&session, fields).await?;
    Ok(ok(created).with_status(StatusCode::CREATED))
}

/// `PUT /jobs/:id`
pub async fn update_job(
    State(state): State<AppState>,
    session: Session,
    WithRejection(Path(id), _): WithRejection<Path<String>, ApiError>,
    WithRejection(Json(fields), _): WithRejection<Json<JobFields>, ApiError>,
) -> ApiResult<Envelope<Job>> {
    let updated = state
        .job_mutation
        .update(&session, &JobId::from(id), fields)
        .await?;
    Ok(ok(updated))
}

/// `DELETE /jobs/:id`
pub async fn delete_job(
    State(state): State<AppState>,
    session: Session,
    WithRejection(Path(id), _): WithRejection<Path<String>, ApiError>,
) -> ApiResult<Envelope<DeleteResponse>> {
    state
        .job_mutation
        .delete(&session, &JobId::from(id))
        .await?;
    Ok(ok(DeleteResponse { success: true }))
}
