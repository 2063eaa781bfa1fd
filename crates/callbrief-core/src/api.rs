use std::path::Path;

use reqwest::{Response, StatusCode};

use crate::error::CallbriefError;

pub(crate) const TRANSCRIPTIONS_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
pub(crate) const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Hard upload limit of the hosted Whisper endpoint.
pub const MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// A non-success API response, split into the cases users need to tell apart.
#[derive(Debug)]
pub(crate) enum ApiFailure {
    Unauthorized,
    RateLimited { reason: String },
    PayloadTooLarge { reason: String },
    Other { status: StatusCode, body: String },
}

/// Pass a successful response through, classify everything else.
pub(crate) async fn check_response(response: Response) -> Result<Response, ApiFailure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(%status, body = %body, "API request failed");

    Err(match status {
        StatusCode::UNAUTHORIZED => ApiFailure::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => ApiFailure::RateLimited { reason: body },
        StatusCode::PAYLOAD_TOO_LARGE => ApiFailure::PayloadTooLarge { reason: body },
        status => ApiFailure::Other { status, body },
    })
}

impl ApiFailure {
    /// Error for a failed transcription upload of the given audio file.
    pub(crate) fn into_transcription_error(
        self,
        audio_path: &Path,
        size_bytes: u64,
    ) -> CallbriefError {
        match self {
            ApiFailure::Unauthorized => CallbriefError::Unauthorized,
            ApiFailure::RateLimited { reason } => CallbriefError::RateLimited { reason },
            ApiFailure::PayloadTooLarge { .. } => CallbriefError::AudioTooLarge {
                audio_path: audio_path.to_path_buf(),
                size_bytes,
                limit_bytes: MAX_UPLOAD_BYTES,
            },
            ApiFailure::Other { status, body } => CallbriefError::TranscriptionFailed {
                audio_path: audio_path.to_path_buf(),
                reason: format!("{status}: {body}"),
            },
        }
    }

    /// Error for a failed summarization request.
    pub(crate) fn into_summarization_error(self) -> CallbriefError {
        match self {
            ApiFailure::Unauthorized => CallbriefError::Unauthorized,
            ApiFailure::RateLimited { reason } => CallbriefError::RateLimited { reason },
            ApiFailure::PayloadTooLarge { reason } => {
                CallbriefError::SummarizationFailed { reason }
            }
            ApiFailure::Other { status, body } => CallbriefError::SummarizationFailed {
                reason: format!("{status}: {body}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_a_distinct_error_kind() {
        let err = ApiFailure::Unauthorized.into_transcription_error(Path::new("a.wav"), 10);
        assert!(matches!(err, CallbriefError::Unauthorized));
        let err = ApiFailure::Unauthorized.into_summarization_error();
        assert!(matches!(err, CallbriefError::Unauthorized));
    }

    #[test]
    fn rate_limit_keeps_the_api_reason() {
        let failure = ApiFailure::RateLimited {
            reason: "try again later".to_string(),
        };
        match failure.into_transcription_error(Path::new("a.wav"), 10) {
            CallbriefError::RateLimited { reason } => assert_eq!(reason, "try again later"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn oversized_upload_reports_size_and_limit() {
        let failure = ApiFailure::PayloadTooLarge {
            reason: "too big".to_string(),
        };
        match failure.into_transcription_error(Path::new("big.wav"), 30_000_000) {
            CallbriefError::AudioTooLarge {
                audio_path,
                size_bytes,
                limit_bytes,
            } => {
                assert_eq!(audio_path, Path::new("big.wav"));
                assert_eq!(size_bytes, 30_000_000);
                assert_eq!(limit_bytes, MAX_UPLOAD_BYTES);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn other_statuses_carry_status_and_body() {
        let failure = ApiFailure::Other {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };
        match failure.into_transcription_error(Path::new("a.wav"), 10) {
            CallbriefError::TranscriptionFailed { reason, .. } => {
                assert!(reason.contains("500"));
                assert!(reason.contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let failure = ApiFailure::Other {
            status: StatusCode::BAD_REQUEST,
            body: "bad form".to_string(),
        };
        match failure.into_summarization_error() {
            CallbriefError::SummarizationFailed { reason } => {
                assert!(reason.contains("400"));
                assert!(reason.contains("bad form"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
