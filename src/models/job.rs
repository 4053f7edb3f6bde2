use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle status of an analysis job.
///
/// Transitions are monotonic: `pending → processing → {completed|failed}`.
/// `Pending` is the column default but is never observable through the API:
/// submission writes `processing` directly because job creation and the
/// inference call are not separated by a yield point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// A terminal job is never re-processed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Kind of media submitted for analysis. Doubles as the inference
/// endpoint path segment (`/analyze/image`, `/analyze/video`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// One submitted analysis request and its lifecycle record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub id: i64,
    pub user_id: String,
    pub kind: MediaKind,
    pub status: JobStatus,
    pub original_file_name: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Free-form job metadata persisted as JSONB. Keys are camelCase to match
/// what the dashboard reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<BTreeMap<String, i64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_detections: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_frames: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobMetadata {
    /// Metadata for a successfully completed job.
    pub fn completed(counts: BTreeMap<String, i64>, total_detections: i64) -> Self {
        Self {
            counts: Some(counts),
            total_detections: Some(total_detections),
            ..Self::default()
        }
    }

    /// Adds the frame totals reported for a video job.
    pub fn with_frames(mut self, total_frames: Option<i64>, processed_frames: Option<i64>) -> Self {
        self.total_frames = total_frames;
        self.processed_frames = processed_frames;
        self
    }

    /// Metadata for a failed job: the stringified error only.
    pub fn failed(error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_roundtrip() {
        for status in [
            JobStatus::Pending,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            let s = status.to_string();
            assert_eq!(s.parse::<JobStatus>().unwrap(), status);
        }
        assert_eq!(JobStatus::Processing.to_string(), "processing");
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
    }

    #[test]
    fn test_media_kind_endpoint_segment() {
        assert_eq!(MediaKind::Image.to_string(), "image");
        assert_eq!(MediaKind::Video.to_string(), "video");
    }

    #[test]
    fn test_completed_metadata_keys_are_camel_case() {
        let mut counts = BTreeMap::new();
        counts.insert("car".to_string(), 2);
        let meta = JobMetadata::completed(counts, 2).with_frames(Some(300), Some(10));
        let value = serde_json::to_value(&meta).unwrap();

        assert_eq!(value["totalDetections"], 2);
        assert_eq!(value["totalFrames"], 300);
        assert_eq!(value["processedFrames"], 10);
        assert_eq!(value["counts"]["car"], 2);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_failed_metadata_carries_only_error() {
        let meta = JobMetadata::failed("model unavailable".to_string());
        let value = serde_json::to_value(&meta).unwrap();

        assert_eq!(value["error"], "model unavailable");
        assert!(value.get("counts").is_none());
        assert!(value.get("totalDetections").is_none());
    }
}
