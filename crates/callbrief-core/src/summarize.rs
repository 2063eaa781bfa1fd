use std::path::Path;

use tokio::fs;

use crate::api;
use crate::error::{CallbriefError, Result};
use crate::transcribe::load_transcript;
use crate::types::Transcript;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that creates clear, \
comprehensive summaries of business conversations and meetings.";

/// Default emphasis for the summary. Overridable per run.
pub const DEFAULT_FOCUS: &str = "\
The majority of the summary should be focused on discussions around pricing, if they occur. \
If they do not discuss pricing of any products, please indicate.

The pricing conversation should take the following output:
- Pricing offer (what amount of money was estimated), with specifics in terms of how much \
was offered for the platform vs. user licenses
- Reaction to pricing (what was the prospect's feedback on the pricing, if any)
- Customer budget, if indicated
- Pricing comparison to competitors, if any. Please specify which competitors, if discussed.";

/// Build the user prompt sent to the chat model.
pub fn build_prompt(transcript_text: &str, focus: &str) -> String {
    format!(
        "Please provide a comprehensive summary of the following conversation transcript.\n\n\
         Key points to include in the summary:\n\
         - Main topics discussed\n\
         - Key decisions made\n\
         - Action items or next steps\n\
         - Important details or agreements\n\
         - Overall tone and context\n\n\
         {focus}\n\n\
         Transcript:\n\
         {transcript_text}\n\n\
         Please provide a clear, structured summary that captures the essence of this conversation."
    )
}

/// Generate a summary for a transcript using the chat-completions API.
pub async fn summarize_transcript(
    api_key: &str,
    model: &str,
    transcript: &Transcript,
    focus: &str,
) -> Result<String> {
    tracing::debug!(model, "requesting summary");

    let prompt = build_prompt(&transcript.text, focus);

    let response = reqwest::Client::new()
        .post(api::CHAT_COMPLETIONS_URL)
        .bearer_auth(api_key)
        .json(&serde_json::json!({
            "model": model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "max_tokens": 1000,
            "temperature": 0.3,
        }))
        .send()
        .await?;

    let response = api::check_response(response)
        .await
        .map_err(|failure| failure.into_summarization_error())?;

    let body = response.json::<serde_json::Value>().await?;
    let content = body["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| CallbriefError::SummarizationFailed {
            reason: format!("unexpected API response: {body}"),
        })?;

    Ok(content.to_string())
}

/// Summarize a persisted transcript and write the result as plain text.
pub async fn summarize_transcript_file(
    api_key: &str,
    model: &str,
    focus: &str,
    transcript_path: &Path,
    output_path: &Path,
) -> Result<()> {
    let transcript = load_transcript(transcript_path).await?;
    let summary = summarize_transcript(api_key, model, &transcript, focus).await?;
    fs::write(output_path, summary).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_transcript_and_focus() {
        let prompt = build_prompt("we agreed on $40k per year", "Focus on renewal risk.");
        assert!(prompt.contains("we agreed on $40k per year"));
        assert!(prompt.contains("Focus on renewal risk."));
        assert!(prompt.starts_with("Please provide a comprehensive summary"));
    }

    #[test]
    fn default_focus_targets_pricing() {
        let prompt = build_prompt("hello", DEFAULT_FOCUS);
        assert!(prompt.contains("discussions around pricing"));
        assert!(prompt.contains("Pricing comparison to competitors"));
    }
}
