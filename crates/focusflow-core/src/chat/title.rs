//! Session title generation via the model.
//!
//! `generate_title` asks the model for a 3-5 word summary of the prompt that
//! opened a session. Any failure, or an empty answer, yields
//! [`FALLBACK_TITLE`] so a turn never fails because of its title.

use focusflow_types::chat::FALLBACK_TITLE;
use focusflow_types::llm::{CompletionRequest, LlmError, LlmMessage};

use crate::llm::box_provider::BoxLlmProvider;

/// Instruction prefixed to the user's prompt for the title call.
const TITLE_INSTRUCTION: &str = "Summarize this prompt in 3-5 words:";

const TITLE_MAX_TOKENS: u32 = 32;
const TITLE_TEMPERATURE: f64 = 0.3;

/// Build the one-shot completion request used for titling.
pub fn title_request(prompt: &str, model: &str) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        messages: vec![LlmMessage::user(format!("{TITLE_INSTRUCTION} {prompt}"))],
        max_tokens: Some(TITLE_MAX_TOKENS),
        temperature: Some(TITLE_TEMPERATURE),
        stream: false,
    }
}

/// Strip whitespace and any surrounding quotes the model wrapped the title in.
pub fn clean_title(raw: &str) -> String {
    raw.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_string()
}

/// Ask the model for a title; the raw model error is returned to the caller.
#[tracing::instrument(name = "generate_title", skip(provider, prompt), fields(model = %model))]
pub async fn try_generate_title(
    provider: &BoxLlmProvider,
    prompt: &str,
    model: &str,
) -> Result<String, LlmError> {
    let response = provider.complete(&title_request(prompt, model)).await?;
    Ok(clean_title(&response.content))
}

/// Title for a new session. Never fails.
pub async fn generate_title(provider: &BoxLlmProvider, prompt: &str, model: &str) -> String {
    match try_generate_title(provider, prompt, model).await {
        Ok(title) if !title.is_empty() => title,
        Ok(_) => {
            tracing::warn!("model returned an empty title, using fallback");
            FALLBACK_TITLE.to_string()
        }
        Err(e) => {
            tracing::warn!(error = %e, "title generation failed, using fallback");
            FALLBACK_TITLE.to_string()
        }
    }
}
