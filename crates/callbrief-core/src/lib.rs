//! Callbrief Core Library
//!
//! Core functionality for turning a directory of recorded calls into audio
//! tracks, Whisper transcripts, and focused AI-generated summaries. Every
//! stage writes a durable output file keyed by the video's base name, and
//! reruns skip stages whose output already exists.

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod layout;
pub mod pipeline;
pub mod summarize;
pub mod transcribe;
pub mod types;

// Re-export commonly used items at crate root
pub use api::MAX_UPLOAD_BYTES;
pub use config::{Config, API_KEY_ENV_VAR, DEFAULT_SUMMARY_MODEL, DEFAULT_TRANSCRIPTION_MODEL};
pub use error::{CallbriefError, Result};
pub use extract::{ensure_ffmpeg, ensure_ffprobe, extract_audio, probe_duration};
pub use format::format_timestamp;
pub use layout::{asset_stem, Layout, VIDEO_EXTENSIONS};
pub use pipeline::{
    pending_stages, preflight, process_video, AssetReport, RunReport, Stage, StageStatus, STAGES,
};
pub use summarize::{build_prompt, summarize_transcript, summarize_transcript_file, DEFAULT_FOCUS};
pub use transcribe::{load_transcript, merge_transcripts, transcribe_audio_file};
pub use types::{Segment, StageSummary, Transcript};
