//! Session management CLI commands: list, history, rename, delete.
//!
//! Provides grouped session browsing with rich tables, history printing,
//! and deletion with confirmation prompt.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use focusflow_types::chat::PREVIOUS_30_DAYS;
use focusflow_types::error::ChatError;
use focusflow_types::message::MessageRole;

use super::parse_session_id;
use crate::state::AppState;

const TITLE_WIDTH: usize = 48;

/// List sessions grouped into Today, Yesterday and Previous 30 Days.
///
/// # Examples
///
/// ```bash
/// focusflow sessions
/// focusflow sessions --query docker --json
/// ```
pub async fn list_sessions(state: &AppState, query: Option<&str>, json: bool) -> Result<()> {
    let grouped = state.chat_service.list_sessions_grouped(query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&grouped)?);
        return Ok(());
    }

    if grouped.is_empty() {
        println!();
        match query {
            Some(q) if !q.is_empty() => println!(
                "  {} No sessions match '{}'.",
                style("i").blue().bold(),
                style(q).cyan()
            ),
            _ => println!(
                "  {} No sessions yet. Start one with: {}",
                style("i").blue().bold(),
                style("focusflow chat \"<prompt>\"").yellow()
            ),
        }
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("When").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    let buckets = [
        ("Today", &grouped.today),
        ("Yesterday", &grouped.yesterday),
        (PREVIOUS_30_DAYS, &grouped.previous_30_days),
    ];
    for (label, sessions) in buckets {
        for (i, session) in sessions.iter().enumerate() {
            let when = if i == 0 { label } else { "" };
            table.add_row(vec![
                Cell::new(when).fg(Color::DarkGrey),
                Cell::new(truncate(&session.title, TITLE_WIDTH)).fg(Color::Cyan),
                Cell::new(session.id).fg(Color::DarkGrey),
            ]);
        }
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{}",
        style(grouped.len()).bold(),
        if grouped.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Print a session's messages, oldest first.
pub async fn show_history(state: &AppState, id: &str, json: bool) -> Result<()> {
    let session_id = parse_session_id(id)?;
    let history = state
        .chat_service
        .get_session_history(session_id)
        .await
        .with_context(|| format!("Could not load session '{session_id}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&history.title).cyan().bold());
    println!();
    for message in &history.chat_history {
        let label = match message.role {
            MessageRole::User => style("You").green().bold(),
            MessageRole::Ai => style("AI").magenta().bold(),
        };
        println!(
            "{} {}",
            label,
            style(message.created_at.format("%Y-%m-%d %H:%M")).dim()
        );
        println!("{}", message.content.trim_end());
        println!();
    }
    if history.chat_history.is_empty() {
        println!("  {}", style("(no messages)").dim());
        println!();
    }

    Ok(())
}

/// Give a session a new title.
pub async fn rename_session(state: &AppState, id: &str, title: &str, json: bool) -> Result<()> {
    let session_id = parse_session_id(id)?;
    let title = title.trim();
    if title.is_empty() {
        anyhow::bail!("title must not be empty");
    }

    let session = state.chat_service.rename_session(session_id, title).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!(
            "  {} Session renamed to '{}'.",
            style("✓").green().bold(),
            style(&session.title).cyan()
        );
    }
    Ok(())
}

/// Delete a session with confirmation.
///
/// # Examples
///
/// ```bash
/// focusflow delete <session-id>
/// focusflow delete <session-id> --force
/// ```
pub async fn delete_session(state: &AppState, id: &str, force: bool, json: bool) -> Result<()> {
    let session_id = parse_session_id(id)?;
    let history = match state.chat_service.get_session_history(session_id).await {
        Ok(history) => history,
        Err(ChatError::SessionNotFound(_)) => anyhow::bail!("Session '{session_id}' not found"),
        Err(e) => return Err(e.into()),
    };

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete session '{}' ({} messages)?",
                style(&history.title).red().bold(),
                history.chat_history.len()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.chat_service.delete_session(session_id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": true, "session_id": session_id.to_string()})
        );
    } else {
        println!(
            "  {} Session '{}' deleted.",
            style("x").red().bold(),
            history.title
        );
    }

    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("Docker", 10), "Docker");
        assert_eq!(truncate("Kubernetes Pod Scheduling", 10), "Kuberne...");
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }
}
