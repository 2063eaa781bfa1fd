use crate::error::{CallbriefError, Result};
use crate::layout::Layout;
use crate::summarize::DEFAULT_FOCUS;

pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const DEFAULT_SUMMARY_MODEL: &str = "gpt-3.5-turbo";

/// Everything one pipeline run needs to know.
#[derive(Debug, Clone)]
pub struct Config {
    pub layout: Layout,
    pub api_key: String,
    pub transcription_model: String,
    pub summary_model: String,
    /// Extra instructions steering what the summary emphasizes.
    pub focus: String,
    /// Re-run stages even when their output files already exist.
    pub force: bool,
    /// Process at most this many videos.
    pub limit: Option<usize>,
}

impl Config {
    pub fn new(layout: Layout, api_key: String) -> Self {
        Self {
            layout,
            api_key,
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
            focus: DEFAULT_FOCUS.to_string(),
            force: false,
            limit: None,
        }
    }

    /// Read the API credential from the environment, failing with a named
    /// variable so the user knows what to set.
    pub fn api_key_from_env() -> Result<String> {
        std::env::var(API_KEY_ENV_VAR).map_err(|_| CallbriefError::MissingApiKey {
            env_var: API_KEY_ENV_VAR.to_string(),
        })
    }
}
