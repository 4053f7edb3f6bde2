use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::models::analysis::AnalyzeOptions;
use crate::models::detection::Detection;
use crate::models::job::MediaKind;

/// Client for the external ML inference service.
///
/// One HTTP attempt per invocation: retry policy, if ever wanted, belongs to
/// the caller. The base URL is injected at construction so tests can point
/// the client at a stub endpoint.
pub struct InferenceClient {
    http: Client,
    base_url: String,
}

/// Decoded body of a successful `/analyze/*` call. The service echoes back
/// `job_id` and `status` fields as well; those are ignored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub detections: Vec<Detection>,
    pub counts: BTreeMap<String, i64>,
    #[serde(default)]
    pub total_frames: Option<i64>,
    #[serde(default)]
    pub processed_frames: Option<i64>,
}

impl InferenceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, InferenceError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Stream a file plus its analysis parameters to `/analyze/{kind}` and
    /// decode the detection payload.
    ///
    /// Any non-success status is a hard failure carrying the response body
    /// as detail. Relative cropped-image URLs are resolved against the
    /// configured base address before the payload is handed back.
    pub async fn analyze(
        &self,
        kind: MediaKind,
        job_id: i64,
        file_name: &str,
        file_bytes: Vec<u8>,
        opts: &AnalyzeOptions,
    ) -> Result<InferenceResponse, InferenceError> {
        let url = format!("{}/analyze/{}", self.base_url, kind);

        let mut form = Form::new()
            .part(
                "file",
                Part::bytes(file_bytes).file_name(file_name.to_string()),
            )
            .text("job_id", job_id.to_string())
            .text("return_cropped", opts.return_cropped.to_string())
            .text("generate_descriptions", opts.generate_descriptions.to_string());

        if kind == MediaKind::Video {
            form = form.text("frame_interval", opts.frame_interval.to_string());
        }

        let response = self.http.post(&url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(InferenceError::Service { status, detail });
        }

        let body = response.bytes().await?;
        let mut decoded: InferenceResponse = serde_json::from_slice(&body)?;

        for detection in &mut decoded.detections {
            if let Some(url) = detection.cropped_image_url.take() {
                detection.cropped_image_url = Some(self.resolve_media_url(url));
            }
        }

        Ok(decoded)
    }

    /// Probe the inference service's `/health` endpoint.
    pub async fn health_check(&self) -> Result<(), InferenceError> {
        let url = format!("{}/health", self.base_url);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(InferenceError::Service { status, detail });
        }
        Ok(())
    }

    /// Cropped-image URLs may come back relative to the inference service's
    /// static mount; absolute URLs pass through unchanged.
    fn resolve_media_url(&self, url: String) -> String {
        if url.starts_with("http") {
            url
        } else {
            format!("{}{}", self.base_url, url)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("inference service returned {status}: {detail}")]
    Service { status: StatusCode, detail: String },

    #[error("failed to reach inference service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("inference service returned an undecodable body: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}
