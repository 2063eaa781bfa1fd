use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{CallbriefError, Result};
use crate::extract;
use crate::layout::{asset_stem, Layout};
use crate::summarize;
use crate::transcribe;
use crate::types::StageSummary;

/// The three stages of an asset's pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Transcribe,
    Summarize,
}

pub const STAGES: [Stage; 3] = [Stage::Extract, Stage::Transcribe, Stage::Summarize];

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::Transcribe => "transcribe",
            Stage::Summarize => "summarize",
        }
    }

    /// The durable output file whose existence marks this stage complete.
    pub fn output_path(self, layout: &Layout, stem: &str) -> PathBuf {
        match self {
            Stage::Extract => layout.audio_path(stem),
            Stage::Transcribe => layout.transcript_path(stem),
            Stage::Summarize => layout.summary_path(stem),
        }
    }

    /// Whether this stage's output file already exists for an asset.
    pub fn is_complete(self, layout: &Layout, stem: &str) -> bool {
        self.output_path(layout, stem).exists()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stages whose output file is missing for an asset.
///
/// Each stage is checked independently against its own output file, so a
/// deleted transcript is regenerated even when its summary still exists.
pub fn pending_stages(layout: &Layout, stem: &str) -> Vec<Stage> {
    STAGES
        .into_iter()
        .filter(|stage| !stage.is_complete(layout, stem))
        .collect()
}

/// What happened to one stage of one asset during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Ran,
    Skipped,
}

/// Language and length of a transcript produced during this run.
#[derive(Debug, Clone)]
pub struct TranscriptMeta {
    pub duration: f64,
    pub language: String,
}

/// Outcome of one asset's trip through the pipeline.
#[derive(Debug)]
pub struct AssetReport {
    pub stem: String,
    pub stages: Vec<(Stage, StageStatus)>,
    /// Set when a stage failed; later stages were not attempted.
    pub failure: Option<(Stage, CallbriefError)>,
    pub transcript: Option<TranscriptMeta>,
}

impl AssetReport {
    pub fn failed(&self) -> bool {
        self.failure.is_some()
    }

    /// A failure that dooms the whole run, not just this asset.
    ///
    /// The driver should stop the batch when this is set; no later asset can
    /// do better against a missing tool or credential.
    pub fn fatal_error(&self) -> Option<&CallbriefError> {
        self.failure
            .as_ref()
            .and_then(|(_, error)| error.is_fatal().then_some(error))
    }
}

/// Checks that must pass before any asset is worth attempting.
pub async fn preflight(config: &Config) -> Result<()> {
    extract::ensure_ffmpeg().await?;
    extract::ensure_ffprobe().await?;
    config.layout.ensure_output_dirs().await?;
    Ok(())
}

/// Run every pending stage for a single video, stopping at the first failure.
///
/// Outputs are persisted as each stage completes, so a rerun after a failure
/// picks up at the failed stage.
pub async fn process_video(config: &Config, video_path: &Path) -> AssetReport {
    let stem = asset_stem(video_path);
    let mut report = AssetReport {
        stem: stem.clone(),
        stages: Vec::new(),
        failure: None,
        transcript: None,
    };

    for stage in STAGES {
        if !config.force && stage.is_complete(&config.layout, &stem) {
            tracing::debug!(asset = %stem, %stage, "output exists, skipping");
            report.stages.push((stage, StageStatus::Skipped));
            continue;
        }

        match run_stage(config, stage, video_path, &stem, &mut report).await {
            Ok(()) => report.stages.push((stage, StageStatus::Ran)),
            Err(e) => {
                tracing::warn!(asset = %stem, %stage, error = %e, "stage failed");
                report.failure = Some((stage, e));
                break;
            }
        }
    }

    report
}

async fn run_stage(
    config: &Config,
    stage: Stage,
    video_path: &Path,
    stem: &str,
    report: &mut AssetReport,
) -> Result<()> {
    let layout = &config.layout;
    match stage {
        Stage::Extract => extract::extract_audio(video_path, &layout.audio_path(stem)).await,
        Stage::Transcribe => {
            let transcript = transcribe::transcribe_audio_file(
                &config.api_key,
                &config.transcription_model,
                &layout.audio_path(stem),
                &layout.transcript_path(stem),
            )
            .await?;
            report.transcript = Some(TranscriptMeta {
                duration: transcript.duration,
                language: transcript.language,
            });
            Ok(())
        }
        Stage::Summarize => {
            summarize::summarize_transcript_file(
                &config.api_key,
                &config.summary_model,
                &config.focus,
                &layout.transcript_path(stem),
                &layout.summary_path(stem),
            )
            .await
        }
    }
}

/// Per-stage tallies and failed assets, accumulated across a whole run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub extract: StageSummary,
    pub transcribe: StageSummary,
    pub summarize: StageSummary,
    pub failed_assets: Vec<String>,
}

impl RunReport {
    pub fn record(&mut self, report: &AssetReport) {
        for (stage, status) in &report.stages {
            let summary = self.summary_mut(*stage);
            match status {
                StageStatus::Ran => summary.successful += 1,
                StageStatus::Skipped => summary.skipped += 1,
            }
        }
        if let Some((stage, _)) = &report.failure {
            self.summary_mut(*stage).failed += 1;
            self.failed_assets.push(report.stem.clone());
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_assets.is_empty()
    }

    pub fn stage_summary(&self, stage: Stage) -> &StageSummary {
        match stage {
            Stage::Extract => &self.extract,
            Stage::Transcribe => &self.transcribe,
            Stage::Summarize => &self.summarize,
        }
    }

    fn summary_mut(&mut self, stage: Stage) -> &mut StageSummary {
        match stage {
            Stage::Extract => &mut self.extract,
            Stage::Transcribe => &mut self.transcribe,
            Stage::Summarize => &mut self.summarize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn layout_with_outputs(files: &[&str]) -> (tempfile::TempDir, Layout) {
        let tmp = tempfile::tempdir().unwrap();
        let layout = Layout::new(tmp.path());
        for dir in [layout.audio_dir(), layout.transcripts_dir(), layout.summaries_dir()] {
            fs::create_dir_all(dir).unwrap();
        }
        for file in files {
            fs::write(tmp.path().join(file), b"x").unwrap();
        }
        (tmp, layout)
    }

    #[test]
    fn all_stages_pending_for_a_new_asset() {
        let (_tmp, layout) = layout_with_outputs(&[]);
        assert_eq!(
            pending_stages(&layout, "call"),
            vec![Stage::Extract, Stage::Transcribe, Stage::Summarize]
        );
    }

    #[test]
    fn nothing_pending_after_a_full_run() {
        let (_tmp, layout) = layout_with_outputs(&[
            "audio/call.wav",
            "transcripts/call.json",
            "summaries/call.txt",
        ]);
        assert!(pending_stages(&layout, "call").is_empty());
    }

    #[test]
    fn existing_audio_skips_only_extraction() {
        let (_tmp, layout) = layout_with_outputs(&["audio/call.wav"]);
        assert_eq!(
            pending_stages(&layout, "call"),
            vec![Stage::Transcribe, Stage::Summarize]
        );
    }

    #[test]
    fn deleted_transcript_is_pending_even_with_summary_present() {
        let (_tmp, layout) = layout_with_outputs(&["audio/call.wav", "summaries/call.txt"]);
        assert_eq!(pending_stages(&layout, "call"), vec![Stage::Transcribe]);
    }

    #[test]
    fn stage_checks_are_per_asset() {
        let (_tmp, layout) = layout_with_outputs(&["audio/done.wav"]);
        assert_eq!(pending_stages(&layout, "other").len(), 3);
        assert_eq!(pending_stages(&layout, "done").len(), 2);
    }

    #[test]
    fn run_report_tallies_stage_outcomes() {
        let mut run = RunReport::default();

        run.record(&AssetReport {
            stem: "a".to_string(),
            stages: vec![
                (Stage::Extract, StageStatus::Skipped),
                (Stage::Transcribe, StageStatus::Ran),
                (Stage::Summarize, StageStatus::Ran),
            ],
            failure: None,
            transcript: None,
        });
        run.record(&AssetReport {
            stem: "b".to_string(),
            stages: vec![(Stage::Extract, StageStatus::Ran)],
            failure: Some((
                Stage::Transcribe,
                CallbriefError::RateLimited {
                    reason: "slow down".to_string(),
                },
            )),
            transcript: None,
        });

        assert_eq!(run.extract.successful, 1);
        assert_eq!(run.extract.skipped, 1);
        assert_eq!(run.transcribe.successful, 1);
        assert_eq!(run.transcribe.failed, 1);
        assert_eq!(run.summarize.successful, 1);
        assert_eq!(run.summarize.total(), 1);
        assert!(run.has_failures());
        assert_eq!(run.failed_assets, vec!["b".to_string()]);
    }

    #[test]
    fn stage_completion_tracks_the_output_file() {
        let (_tmp, layout) = layout_with_outputs(&["transcripts/call.json"]);
        assert!(Stage::Transcribe.is_complete(&layout, "call"));
        assert!(!Stage::Extract.is_complete(&layout, "call"));
        assert!(!Stage::Transcribe.is_complete(&layout, "other"));
    }

    #[test]
    fn missing_tool_failure_dooms_the_whole_run() {
        let report = AssetReport {
            stem: "call".to_string(),
            stages: vec![(Stage::Extract, StageStatus::Skipped)],
            failure: Some((
                Stage::Transcribe,
                CallbriefError::ToolMissing {
                    tool: "ffprobe",
                    reason: "not found on PATH".to_string(),
                },
            )),
            transcript: None,
        };
        assert!(report.failed());
        assert!(report.fatal_error().is_some());
    }

    #[test]
    fn api_failure_dooms_only_the_asset() {
        let report = AssetReport {
            stem: "call".to_string(),
            stages: vec![(Stage::Extract, StageStatus::Ran)],
            failure: Some((
                Stage::Transcribe,
                CallbriefError::RateLimited {
                    reason: "slow down".to_string(),
                },
            )),
            transcript: None,
        };
        assert!(report.failed());
        assert!(report.fatal_error().is_none());
    }

    #[test]
    fn stage_names_are_stable() {
        let names: Vec<_> = STAGES.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["extract", "transcribe", "summarize"]);
    }
}
