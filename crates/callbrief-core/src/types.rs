use serde::{Deserialize, Serialize};

/// Full transcript of one audio file, as returned by the Whisper API in
/// `verbose_json` format. Unknown response fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub id: u32,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Per-stage tally across one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSummary {
    pub successful: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl StageSummary {
    pub fn total(&self) -> usize {
        self.successful + self.skipped + self.failed
    }

    /// Success rate as a percentage; skipped outputs count as successes.
    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        ((self.successful + self.skipped) as f64 / total as f64) * 100.0
    }
}
