use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CallbriefError {
    #[error("{tool} is not available: {reason}")]
    ToolMissing { tool: &'static str, reason: String },

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },

    #[error("Input directory {path} does not exist")]
    MissingInputDir { path: PathBuf },

    #[error("Audio extraction failed for {video_path}: {reason}")]
    AudioExtractionFailed { video_path: PathBuf, reason: String },

    #[error("Transcription failed for {audio_path}: {reason}")]
    TranscriptionFailed { audio_path: PathBuf, reason: String },

    #[error("Summarization failed: {reason}")]
    SummarizationFailed { reason: String },

    #[error("API rejected the request: invalid or expired API key")]
    Unauthorized,

    #[error("API rate limit exceeded: {reason}")]
    RateLimited { reason: String },

    #[error("Audio file {audio_path} is {size_bytes} bytes, over the {limit_bytes} byte upload limit")]
    AudioTooLarge {
        audio_path: PathBuf,
        size_bytes: u64,
        limit_bytes: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),
}

impl CallbriefError {
    /// Fatal errors abort the whole run; everything else fails a single asset.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CallbriefError::ToolMissing { .. }
                | CallbriefError::MissingApiKey { .. }
                | CallbriefError::MissingInputDir { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CallbriefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_problems_are_fatal() {
        assert!(CallbriefError::ToolMissing {
            tool: "ffmpeg",
            reason: "not found on PATH".to_string(),
        }
        .is_fatal());
        assert!(CallbriefError::MissingApiKey {
            env_var: "OPENAI_API_KEY".to_string(),
        }
        .is_fatal());
        assert!(CallbriefError::MissingInputDir {
            path: PathBuf::from("data/videos"),
        }
        .is_fatal());
    }

    #[test]
    fn per_asset_failures_are_not_fatal() {
        assert!(!CallbriefError::RateLimited {
            reason: "busy".to_string(),
        }
        .is_fatal());
        assert!(!CallbriefError::AudioExtractionFailed {
            video_path: PathBuf::from("a.mp4"),
            reason: "corrupt".to_string(),
        }
        .is_fatal());
        assert!(!CallbriefError::Unauthorized.is_fatal());
    }
}
