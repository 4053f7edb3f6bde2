use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::models::detection::{AnalysisCount, AnalysisResult};
use crate::models::job::JobMetadata;
use crate::services::inference::InferenceResponse;

/// Persist everything a successful analysis produced: result rows, count
/// rows, completion metadata, and the status flip to `completed`.
///
/// All writes go through one transaction; readers never observe a
/// `completed` job with a partially written result set.
pub async fn complete_job(
    pool: &PgPool,
    job_id: i64,
    outcome: &InferenceResponse,
    metadata: &JobMetadata,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for detection in &outcome.detections {
        sqlx::query(
            r#"
            INSERT INTO analysis_results
                (job_id, object_id, object_type, confidence, bounding_box,
                 cropped_image_url, description, attributes, frame_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(job_id)
        .bind(&detection.object_id)
        .bind(&detection.object_type)
        .bind(detection.confidence as f32)
        .bind(Json(&detection.bounding_box))
        .bind(&detection.cropped_image_url)
        .bind(&detection.description)
        .bind(&detection.attributes)
        .bind(detection.frame_number)
        .execute(&mut *tx)
        .await?;
    }

    for (object_type, count) in &outcome.counts {
        sqlx::query(
            r#"
            INSERT INTO analysis_counts (job_id, object_type, count)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(job_id)
        .bind(object_type)
        .bind(*count as i32)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        r#"
        UPDATE analysis_jobs
        SET status = 'completed',
            metadata = $1,
            completed_at = NOW(),
            updated_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(Json(metadata))
    .bind(job_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await
}

/// Get all result rows for a job, newest first.
pub async fn get_job_results(
    pool: &PgPool,
    job_id: i64,
) -> Result<Vec<AnalysisResult>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, job_id, object_id, object_type, confidence, bounding_box,
               cropped_image_url, description, attributes, frame_number, created_at
        FROM analysis_results
        WHERE job_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(result_from_row).collect()
}

/// Get all count rows for a job.
pub async fn get_job_counts(pool: &PgPool, job_id: i64) -> Result<Vec<AnalysisCount>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, job_id, object_type, count, frame_number, created_at
        FROM analysis_counts
        WHERE job_id = $1
        ORDER BY id
        "#,
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(count_from_row).collect()
}

fn result_from_row(row: &PgRow) -> Result<AnalysisResult, sqlx::Error> {
    Ok(AnalysisResult {
        id: row.try_get("id")?,
        job_id: row.try_get("job_id")?,
        object_id: row.try_get("object_id")?,
        object_type: row.try_get("object_type")?,
        confidence: row.try_get("confidence")?,
        bounding_box: row.try_get("bounding_box")?,
        cropped_image_url: row.try_get("cropped_image_url")?,
        description: row.try_get("description")?,
        attributes: row.try_get("attributes")?,
        frame_number: row.try_get("frame_number")?,
        created_at: row.try_get("created_at")?,
    })
}

fn count_from_row(row: &PgRow) -> Result<AnalysisCount, sqlx::Error> {
    Ok(AnalysisCount {
        id: row.try_get("id")?,
        job_id: row.try_get("job_id")?,
        object_type: row.try_get("object_type")?,
        count: row.try_get("count")?,
        frame_number: row.try_get("frame_number")?,
        created_at: row.try_get("created_at")?,
    })
}
