use axum::extract::{Path, Query, State};
use axum::Json;

use crate::app_state::AppState;
use crate::db::{job_queries, result_queries};
use crate::models::analysis::{JobDetail, ListJobsQuery};
use crate::models::detection::{AnalysisCount, AnalysisResult};
use crate::models::job::AnalysisJob;
use crate::routes::ApiError;
use crate::services::orchestrator::AnalysisError;

/// GET /api/v1/jobs/{id} — a job with its results and counts.
///
/// Read-only: querying an in-flight job returns whatever has been durably
/// committed, which for this pipeline is either nothing (still processing)
/// or the full result set (completed).
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<JobDetail>, ApiError> {
    let job = job_queries::get_job(&state.db, job_id)
        .await?
        .ok_or(AnalysisError::NotFound)?;

    let results = result_queries::get_job_results(&state.db, job_id).await?;
    let counts = result_queries::get_job_counts(&state.db, job_id).await?;

    Ok(Json(JobDetail {
        job,
        results,
        counts,
    }))
}

/// GET /api/v1/jobs — newest-first job listing with limit/offset paging.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<Vec<AnalysisJob>>, ApiError> {
    let jobs = job_queries::list_jobs(
        &state.db,
        query.user_id.as_deref(),
        query.limit,
        query.offset,
    )
    .await?;

    Ok(Json(jobs))
}

/// GET /api/v1/jobs/{id}/results — result rows, newest first.
pub async fn get_job_results(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<Vec<AnalysisResult>>, ApiError> {
    let results = result_queries::get_job_results(&state.db, job_id).await?;
    Ok(Json(results))
}

/// GET /api/v1/jobs/{id}/counts — per-type aggregate counts.
pub async fn get_job_counts(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<Vec<AnalysisCount>>, ApiError> {
    let counts = result_queries::get_job_counts(&state.db, job_id).await?;
    Ok(Json(counts))
}
