use sqlx::PgPool;

use crate::db::{job_queries, result_queries};
use crate::models::analysis::{AnalyzeOptions, AnalyzeResponse};
use crate::models::job::{JobMetadata, JobStatus, MediaKind};
use crate::services::inference::{InferenceClient, InferenceError, InferenceResponse};
use crate::services::intake::MediaUpload;

/// Submit a media file for analysis and drive the job to a terminal state.
///
/// The pipeline is one synchronous call chain: the job row is created with
/// status `processing`, the inference service is invoked once, and the job
/// finishes as either `completed` (results, counts, and metadata persisted
/// in one transaction) or `failed` (error recorded, nothing else written).
/// A failed job is queryable afterwards but is never retried; resubmission
/// creates a new job.
pub async fn submit(
    db: &PgPool,
    inference: &InferenceClient,
    kind: MediaKind,
    upload: MediaUpload,
    opts: AnalyzeOptions,
) -> Result<AnalyzeResponse, AnalysisError> {
    let user_id = opts.user_id.as_deref().unwrap_or("anonymous");

    let job = job_queries::create_job(db, user_id, kind, upload.file_name.as_deref()).await?;

    metrics::counter!("analysis_jobs_total", "kind" => kind.to_string()).increment(1);
    tracing::info!(
        job_id = job.id,
        kind = %kind,
        user_id = %job.user_id,
        file_name = upload.file_name.as_deref().unwrap_or(""),
        "processing analysis job"
    );

    let start = std::time::Instant::now();
    let file_name = upload.file_name.as_deref().unwrap_or("upload");

    match inference
        .analyze(kind, job.id, file_name, upload.bytes, &opts)
        .await
    {
        Ok(outcome) => {
            let metadata = completion_metadata(kind, &outcome);
            result_queries::complete_job(db, job.id, &outcome, &metadata).await?;

            metrics::counter!("analysis_jobs_completed").increment(1);
            metrics::histogram!("analysis_processing_seconds")
                .record(start.elapsed().as_secs_f64());
            tracing::info!(
                job_id = job.id,
                detections = outcome.detections.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "analysis job completed"
            );

            Ok(AnalyzeResponse {
                job_id: job.id,
                status: JobStatus::Completed,
                detections: outcome.detections,
                counts: outcome.counts,
                total_frames: outcome.total_frames,
                processed_frames: outcome.processed_frames,
            })
        }
        Err(e) => {
            tracing::error!(job_id = job.id, error = %e, "analysis job failed");

            let metadata = JobMetadata::failed(e.to_string());
            job_queries::mark_failed(db, job.id, &metadata).await?;

            metrics::counter!("analysis_jobs_failed").increment(1);

            Err(e.into())
        }
    }
}

/// Build the metadata recorded on a completed job: aggregate counts, the
/// detection total, and for video the frame totals reported by the service.
fn completion_metadata(kind: MediaKind, outcome: &InferenceResponse) -> JobMetadata {
    let metadata = JobMetadata::completed(outcome.counts.clone(), outcome.detections.len() as i64);
    match kind {
        MediaKind::Image => metadata,
        MediaKind::Video => metadata.with_frames(outcome.total_frames, outcome.processed_frames),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("job not found")]
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::detection::{BoundingBox, Detection};
    use std::collections::BTreeMap;

    fn outcome() -> InferenceResponse {
        InferenceResponse {
            detections: vec![Detection {
                object_id: "obj_0".to_string(),
                object_type: Some("car".to_string()),
                confidence: 0.92,
                bounding_box: BoundingBox {
                    x: 0.0,
                    y: 0.0,
                    width: 10.0,
                    height: 10.0,
                },
                cropped_image_url: None,
                description: None,
                attributes: None,
                frame_number: None,
            }],
            counts: BTreeMap::from([("car".to_string(), 1)]),
            total_frames: None,
            processed_frames: None,
        }
    }

    #[test]
    fn test_image_completion_metadata() {
        let meta = completion_metadata(MediaKind::Image, &outcome());
        assert_eq!(meta.total_detections, Some(1));
        assert_eq!(meta.counts.as_ref().unwrap()["car"], 1);
        assert!(meta.total_frames.is_none());
        assert!(meta.error.is_none());
    }

    #[test]
    fn test_video_completion_metadata_records_frame_totals() {
        let mut video = outcome();
        video.total_frames = Some(300);
        video.processed_frames = Some(10);

        let meta = completion_metadata(MediaKind::Video, &video);
        assert_eq!(meta.total_frames, Some(300));
        assert_eq!(meta.processed_frames, Some(10));
        assert_eq!(meta.total_detections, Some(1));
    }
}
