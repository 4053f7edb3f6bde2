use std::collections::BTreeMap;

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::models::detection::{AnalysisCount, AnalysisResult, Detection};
use crate::models::job::{AnalysisJob, JobStatus};

/// Analysis options carried alongside an uploaded file.
///
/// `frame_interval` is the sampling stride in frames and only applies to
/// video submissions; the image endpoint leaves it at the default.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnalyzeOptions {
    #[garde(skip)]
    pub return_cropped: bool,

    #[garde(skip)]
    pub generate_descriptions: bool,

    #[garde(inner(length(min = 1, max = 256)))]
    pub user_id: Option<String>,

    #[garde(range(min = 1))]
    pub frame_interval: u32,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            return_cropped: true,
            generate_descriptions: true,
            user_id: None,
            frame_interval: 30,
        }
    }
}

/// Response after submitting media for analysis. The frame totals are only
/// present for video jobs.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub job_id: i64,
    pub status: JobStatus,
    pub detections: Vec<Detection>,
    pub counts: BTreeMap<String, i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_frames: Option<i64>,
}

/// A job with its full result and count sets, as returned by the job
/// detail endpoint.
#[derive(Debug, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: AnalysisJob,
    pub results: Vec<AnalysisResult>,
    pub counts: Vec<AnalysisCount>,
}

/// Query parameters for the job listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub user_id: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// Error body returned for any failed API call.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = AnalyzeOptions::default();
        assert!(opts.return_cropped);
        assert!(opts.generate_descriptions);
        assert_eq!(opts.frame_interval, 30);
        assert!(opts.user_id.is_none());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_zero_frame_interval_rejected() {
        let opts = AnalyzeOptions {
            frame_interval: 0,
            ..AnalyzeOptions::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_empty_user_id_rejected() {
        let opts = AnalyzeOptions {
            user_id: Some(String::new()),
            ..AnalyzeOptions::default()
        };
        assert!(opts.validate().is_err());
    }
}
