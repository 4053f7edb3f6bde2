use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::models::job::{AnalysisJob, JobMetadata, JobStatus, MediaKind};

const JOB_COLUMNS: &str = "id, user_id, kind, status, original_file_name, metadata, \
                           created_at, updated_at, completed_at";

/// Insert a new analysis job.
///
/// Submission and the inference call are not separated by a yield point, so
/// the row is created directly in `processing` rather than the schema's
/// `pending` default.
pub async fn create_job(
    pool: &PgPool,
    user_id: &str,
    kind: MediaKind,
    original_file_name: Option<&str>,
) -> Result<AnalysisJob, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO analysis_jobs (user_id, kind, status, original_file_name)
        VALUES ($1, $2, 'processing', $3)
        RETURNING {JOB_COLUMNS}
        "#,
    ))
    .bind(user_id)
    .bind(kind.to_string())
    .bind(original_file_name)
    .fetch_one(pool)
    .await?;

    job_from_row(&row)
}

/// Get a job by ID
pub async fn get_job(pool: &PgPool, job_id: i64) -> Result<Option<AnalysisJob>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        SELECT {JOB_COLUMNS}
        FROM analysis_jobs
        WHERE id = $1
        "#,
    ))
    .bind(job_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(job_from_row).transpose()
}

/// List jobs newest-first with simple limit/offset pagination. A missing
/// `user_id` matches all owners.
pub async fn list_jobs(
    pool: &PgPool,
    user_id: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<AnalysisJob>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {JOB_COLUMNS}
        FROM analysis_jobs
        WHERE ($1::varchar IS NULL OR user_id = $1)
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    ))
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter().map(job_from_row).collect()
}

/// Record a failed job: the stringified error lands in metadata, no result
/// or count rows are ever written for it.
pub async fn mark_failed(
    pool: &PgPool,
    job_id: i64,
    metadata: &JobMetadata,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE analysis_jobs
        SET status = 'failed',
            metadata = $1,
            updated_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(Json(metadata))
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub(crate) fn job_from_row(row: &PgRow) -> Result<AnalysisJob, sqlx::Error> {
    let kind_str: String = row.try_get("kind")?;
    let kind: MediaKind = kind_str
        .parse()
        .map_err(|_| sqlx::Error::Decode(format!("unknown media kind: {kind_str}").into()))?;

    let status_str: String = row.try_get("status")?;
    let status: JobStatus = status_str
        .parse()
        .map_err(|_| sqlx::Error::Decode(format!("unknown job status: {status_str}").into()))?;

    Ok(AnalysisJob {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        kind,
        status,
        original_file_name: row.try_get("original_file_name")?,
        metadata: row.try_get("metadata")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        completed_at: row.try_get("completed_at")?,
    })
}
