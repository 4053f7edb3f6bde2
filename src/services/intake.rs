use garde::Validate;

use crate::models::analysis::AnalyzeOptions;
use crate::services::orchestrator::AnalysisError;

/// An uploaded media file extracted from a multipart request.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Validate a submission before any job record is created.
///
/// Only presence and option sanity are checked here; content validation is
/// the inference service's concern and acceptable file types are
/// communicated to the user by the presentation layer.
pub fn validate(
    file: Option<MediaUpload>,
    opts: &AnalyzeOptions,
) -> Result<MediaUpload, AnalysisError> {
    let upload = file.ok_or_else(|| AnalysisError::InvalidInput("no file supplied".to_string()))?;

    if upload.bytes.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "uploaded file is empty".to_string(),
        ));
    }

    opts.validate()
        .map_err(|e| AnalysisError::InvalidInput(e.to_string()))?;

    Ok(upload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> MediaUpload {
        MediaUpload {
            file_name: Some("photo.jpg".to_string()),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = validate(None, &AnalyzeOptions::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
        assert!(err.to_string().contains("no file supplied"));
    }

    #[test]
    fn test_empty_file_rejected() {
        let empty = MediaUpload {
            file_name: None,
            bytes: Vec::new(),
        };
        let err = validate(Some(empty), &AnalyzeOptions::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let opts = AnalyzeOptions {
            frame_interval: 0,
            ..AnalyzeOptions::default()
        };
        let err = validate(Some(upload()), &opts).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_valid_submission_accepted() {
        let accepted = validate(Some(upload()), &AnalyzeOptions::default()).unwrap();
        assert_eq!(accepted.file_name.as_deref(), Some("photo.jpg"));
    }
}
