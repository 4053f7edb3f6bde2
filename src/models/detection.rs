use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bounding box in source-media pixel space.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One detected object as reported by the inference service.
///
/// `object_id` is only unique within a job's detection set. `confidence` is
/// whatever the model reported and is not clamped here. `frame_number` is
/// present for video analysis only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    pub object_id: String,
    pub object_type: Option<String>,
    pub confidence: f64,
    pub bounding_box: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cropped_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_number: Option<i32>,
}

/// Persisted detection row belonging to a job. Written once on job
/// completion, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: i64,
    pub job_id: i64,
    pub object_id: String,
    pub object_type: Option<String>,
    pub confidence: Option<f32>,
    pub bounding_box: Option<serde_json::Value>,
    pub cropped_image_url: Option<String>,
    pub description: Option<String>,
    pub attributes: Option<serde_json::Value>,
    pub frame_number: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Persisted aggregate tally of detections of one object type within a job.
/// `frame_number` is reserved for per-frame scoping and is NULL for the
/// aggregate rows the current write path produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisCount {
    pub id: i64,
    pub job_id: i64,
    pub object_type: String,
    pub count: i32,
    pub frame_number: Option<i32>,
    pub created_at: DateTime<Utc>,
}
