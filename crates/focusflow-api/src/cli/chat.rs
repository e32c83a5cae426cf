//! One-shot chat command.

use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use super::parse_session_id;
use crate::state::AppState;

/// Send one prompt and print the model's reply.
///
/// # Examples
///
/// ```bash
/// focusflow chat "How do I write a Dockerfile?"
/// focusflow chat "And multi-stage builds?" --session <session-id>
/// ```
pub async fn send_prompt(
    state: &AppState,
    prompt: &str,
    session: Option<&str>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    if prompt.trim().is_empty() {
        anyhow::bail!("prompt must not be empty");
    }
    let session_id = session.map(parse_session_id).transpose()?;

    let spinner = (!json && !quiet).then(|| {
        let spinner = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(spinner_style);
        }
        spinner.set_message(format!("Asking {}...", state.chat_service.model()));
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    });

    let result = state
        .chat_service
        .handle_chat_turn(prompt, session_id)
        .await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let reply = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    println!();
    println!("{}", reply.reply.trim_end());
    if !quiet {
        println!();
        println!(
            "  {} {} {}",
            style(&reply.session_title).cyan().bold(),
            style("·").dim(),
            style(reply.session_id).dim()
        );
    }
    println!();

    Ok(())
}
