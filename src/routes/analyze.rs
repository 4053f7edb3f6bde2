use std::str::FromStr;

use axum::extract::{Multipart, State};
use axum::Json;

use crate::app_state::AppState;
use crate::models::analysis::{AnalyzeOptions, AnalyzeResponse};
use crate::models::job::MediaKind;
use crate::routes::ApiError;
use crate::services::intake::{self, MediaUpload};
use crate::services::orchestrator::{self, AnalysisError};

/// POST /api/v1/analyze/image — upload an image for object detection.
pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    submit(state, MediaKind::Image, multipart).await
}

/// POST /api/v1/analyze/video — upload a video for frame-sampled analysis.
pub async fn analyze_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    submit(state, MediaKind::Video, multipart).await
}

async fn submit(
    state: AppState,
    kind: MediaKind,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let (file, opts) = parse_submission(multipart).await?;
    let upload = intake::validate(file, &opts)?;

    let response = orchestrator::submit(&state.db, &state.inference, kind, upload, opts).await?;
    Ok(Json(response))
}

/// Extract the file part and option fields from a multipart upload.
/// Unknown parts are ignored; option fields fall back to their defaults
/// when absent.
async fn parse_submission(
    mut multipart: Multipart,
) -> Result<(Option<MediaUpload>, AnalyzeOptions), AnalysisError> {
    let mut file = None;
    let mut opts = AnalyzeOptions::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AnalysisError::InvalidInput(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AnalysisError::InvalidInput(e.to_string()))?;
                file = Some(MediaUpload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            Some("return_cropped") => {
                opts.return_cropped = parse_field("return_cropped", &text(field).await?)?;
            }
            Some("generate_descriptions") => {
                opts.generate_descriptions =
                    parse_field("generate_descriptions", &text(field).await?)?;
            }
            Some("frame_interval") => {
                opts.frame_interval = parse_field("frame_interval", &text(field).await?)?;
            }
            Some("user_id") => {
                opts.user_id = Some(text(field).await?);
            }
            _ => {}
        }
    }

    Ok((file, opts))
}

async fn text(field: axum::extract::multipart::Field<'_>) -> Result<String, AnalysisError> {
    field
        .text()
        .await
        .map_err(|e| AnalysisError::InvalidInput(e.to_string()))
}

fn parse_field<T: FromStr>(name: &str, raw: &str) -> Result<T, AnalysisError> {
    raw.parse()
        .map_err(|_| AnalysisError::InvalidInput(format!("invalid value for {name}: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_field() {
        assert!(parse_field::<bool>("return_cropped", "true").unwrap());
        assert!(!parse_field::<bool>("return_cropped", "false").unwrap());
        assert!(parse_field::<bool>("return_cropped", "yes").is_err());
    }

    #[test]
    fn test_parse_frame_interval_field() {
        assert_eq!(parse_field::<u32>("frame_interval", "30").unwrap(), 30);
        assert!(parse_field::<u32>("frame_interval", "-1").is_err());
        assert!(parse_field::<u32>("frame_interval", "every other").is_err());
    }
}
