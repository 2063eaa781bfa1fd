use std::path::Path;

use reqwest::multipart;
use tokio::fs;

use crate::api::{self, MAX_UPLOAD_BYTES};
use crate::error::Result;
use crate::extract;
use crate::types::{Segment, Transcript};

/// Transcribe one audio file and persist the transcript as pretty JSON.
///
/// Files over the upload limit are split into equal-duration chunks,
/// transcribed one at a time, and merged back into a single transcript.
pub async fn transcribe_audio_file(
    api_key: &str,
    model: &str,
    audio_path: &Path,
    output_path: &Path,
) -> Result<Transcript> {
    let size_bytes = fs::metadata(audio_path).await?.len();

    let transcript = if size_bytes <= MAX_UPLOAD_BYTES {
        request_transcription(api_key, model, audio_path).await?
    } else {
        transcribe_chunked(api_key, model, audio_path, size_bytes).await?
    };

    let pretty_json = serde_json::to_string_pretty(&transcript)?;
    fs::write(output_path, &pretty_json).await?;

    Ok(transcript)
}

/// Load a previously persisted transcript.
pub async fn load_transcript(path: &Path) -> Result<Transcript> {
    let json_content = fs::read_to_string(path).await?;
    let transcript: Transcript = serde_json::from_str(&json_content)?;
    Ok(transcript)
}

/// Single multipart upload to the Whisper endpoint.
async fn request_transcription(api_key: &str, model: &str, audio_path: &Path) -> Result<Transcript> {
    tracing::debug!(audio = %audio_path.display(), model, "requesting transcription");

    let bytes = fs::read(audio_path).await?;
    let size_bytes = bytes.len() as u64;
    let file_name = audio_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio.wav".to_string());

    let part = multipart::Part::bytes(bytes)
        .file_name(file_name)
        .mime_str("audio/wav")?;
    let form = multipart::Form::new()
        .part("file", part)
        .text("model", model.to_string())
        .text("response_format", "verbose_json");

    let response = reqwest::Client::new()
        .post(api::TRANSCRIPTIONS_URL)
        .bearer_auth(api_key)
        .multipart(form)
        .send()
        .await?;

    let response = api::check_response(response)
        .await
        .map_err(|failure| failure.into_transcription_error(audio_path, size_bytes))?;

    let transcript = response.json::<Transcript>().await?;
    Ok(transcript)
}

/// Split an oversized file into chunks that fit the upload limit, transcribe
/// each, and stitch the results back together.
async fn transcribe_chunked(
    api_key: &str,
    model: &str,
    audio_path: &Path,
    size_bytes: u64,
) -> Result<Transcript> {
    let chunk_count = size_bytes.div_ceil(MAX_UPLOAD_BYTES) as usize;
    let total_duration = extract::probe_duration(audio_path).await?;
    let chunk_duration = total_duration / chunk_count as f64;

    tracing::debug!(
        audio = %audio_path.display(),
        size_bytes,
        chunk_count,
        chunk_duration,
        "audio exceeds upload limit, transcribing in chunks"
    );

    let scratch = tempfile::tempdir()?;
    let mut chunks = Vec::with_capacity(chunk_count);

    for index in 0..chunk_count {
        let chunk_path = scratch.path().join(format!("chunk_{index:03}.wav"));
        let start = index as f64 * chunk_duration;
        extract::cut_chunk(audio_path, &chunk_path, start, chunk_duration).await?;
        chunks.push(request_transcription(api_key, model, &chunk_path).await?);
    }

    Ok(merge_transcripts(chunks))
}

/// Merge transcripts of consecutive chunks into one seamless transcript.
///
/// Segment timestamps are shifted by the accumulated duration of earlier
/// chunks and segment ids are renumbered; the detected language is taken from
/// the first chunk.
pub fn merge_transcripts(chunks: Vec<Transcript>) -> Transcript {
    if chunks.len() == 1 {
        return chunks.into_iter().next().unwrap();
    }

    let text = chunks
        .iter()
        .map(|chunk| chunk.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let language = chunks
        .first()
        .map(|chunk| chunk.language.clone())
        .unwrap_or_default();

    let mut segments: Vec<Segment> = Vec::new();
    let mut offset = 0.0;
    for chunk in &chunks {
        for segment in &chunk.segments {
            segments.push(Segment {
                id: segments.len() as u32,
                start: segment.start + offset,
                end: segment.end + offset,
                text: segment.text.clone(),
            });
        }
        offset += chunk.duration;
    }

    Transcript {
        text,
        language,
        duration: chunks.iter().map(|chunk| chunk.duration).sum(),
        segments,
    }
}
