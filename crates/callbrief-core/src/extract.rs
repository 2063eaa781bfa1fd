use std::io::ErrorKind;
use std::path::Path;

use tokio::process::Command;

use crate::error::{CallbriefError, Result};

/// Verify that ffmpeg is runnable before any asset is touched.
///
/// A missing binary is fatal for the whole run, so the caller should invoke
/// this once up front rather than discovering it midway through a batch.
pub async fn ensure_ffmpeg() -> Result<()> {
    ensure_tool("ffmpeg").await
}

/// Same preflight for ffprobe, which chunked transcription relies on.
pub async fn ensure_ffprobe() -> Result<()> {
    ensure_tool("ffprobe").await
}

async fn ensure_tool(tool: &'static str) -> Result<()> {
    match Command::new(tool).arg("-version").output().await {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => Err(CallbriefError::ToolMissing {
            tool,
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(CallbriefError::ToolMissing {
            tool,
            reason: "not found on PATH".to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Extract mono 16 kHz PCM audio from a video file using ffmpeg.
pub async fn extract_audio(video_path: &Path, audio_path: &Path) -> Result<()> {
    tracing::debug!(video = %video_path.display(), audio = %audio_path.display(), "running ffmpeg");

    let output = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(video_path)
        .arg("-vn")
        .arg("-acodec")
        .arg("pcm_s16le")
        .arg("-ar")
        .arg("16000")
        .arg("-ac")
        .arg("1")
        .arg(audio_path)
        .output()
        .await
        .map_err(|e| spawn_error("ffmpeg", e))?;

    if !output.status.success() {
        return Err(CallbriefError::AudioExtractionFailed {
            video_path: video_path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(())
}

/// Media duration in seconds, via ffprobe.
pub async fn probe_duration(media_path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .arg("-v")
        .arg("quiet")
        .arg("-show_entries")
        .arg("format=duration")
        .arg("-of")
        .arg("csv=p=0")
        .arg(media_path)
        .output()
        .await
        .map_err(|e| spawn_error("ffprobe", e))?;

    if !output.status.success() {
        return Err(CallbriefError::AudioExtractionFailed {
            video_path: media_path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout.trim().parse::<f64>().map_err(|_| {
        CallbriefError::AudioExtractionFailed {
            video_path: media_path.to_path_buf(),
            reason: format!("ffprobe returned an unparseable duration: {:?}", stdout.trim()),
        }
    })
}

/// Cut a mono 16 kHz slice out of an audio file, for chunked transcription.
pub(crate) async fn cut_chunk(
    audio_path: &Path,
    chunk_path: &Path,
    start_secs: f64,
    length_secs: f64,
) -> Result<()> {
    tracing::debug!(
        audio = %audio_path.display(),
        chunk = %chunk_path.display(),
        start_secs,
        length_secs,
        "cutting audio chunk"
    );

    let output = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(audio_path)
        .arg("-ss")
        .arg(start_secs.to_string())
        .arg("-t")
        .arg(length_secs.to_string())
        .arg("-ac")
        .arg("1")
        .arg("-ar")
        .arg("16000")
        .arg("-avoid_negative_ts")
        .arg("make_zero")
        .arg(chunk_path)
        .output()
        .await
        .map_err(|e| spawn_error("ffmpeg", e))?;

    if !output.status.success() {
        return Err(CallbriefError::AudioExtractionFailed {
            video_path: audio_path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(())
}

fn spawn_error(tool: &'static str, e: std::io::Error) -> CallbriefError {
    if e.kind() == ErrorKind::NotFound {
        CallbriefError::ToolMissing {
            tool,
            reason: "not found on PATH".to_string(),
        }
    } else {
        e.into()
    }
}
