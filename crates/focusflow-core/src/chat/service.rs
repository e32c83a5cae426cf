//! Chat service orchestrating one conversation turn end to end.
//!
//! ChatService coordinates the SessionRepository, MessageRepository and the
//! model provider: it creates or loads the session, persists both sides of
//! the exchange, names new sessions and bumps their recency.

use chrono::Local;
use futures_util::StreamExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use focusflow_types::chat::{ChatReply, GroupedSessions, PROVISIONAL_TITLE, SessionHistory};
use focusflow_types::error::ChatError;
use focusflow_types::llm::{CompletionRequest, LlmError, LlmMessage, StreamEvent};
use focusflow_types::message::{Message, MessageDraft};
use focusflow_types::session::{NewSession, Session, SessionUpdate};

use super::grouping::group_by_recency;
use super::title::generate_title;
use crate::llm::box_provider::BoxLlmProvider;
use crate::repository::Repository;
use crate::repository::message::MessageRepository;
use crate::repository::session::SessionRepository;

/// Orchestrates chat turns and session queries.
///
/// Generic over the repositories so focusflow-core never depends on
/// focusflow-infra.
pub struct ChatService<S: SessionRepository, M: MessageRepository> {
    sessions: S,
    messages: M,
    provider: BoxLlmProvider,
    model: String,
    temperature: Option<f64>,
}

impl<S: SessionRepository, M: MessageRepository> ChatService<S, M> {
    pub fn new(sessions: S, messages: M, provider: BoxLlmProvider, model: impl Into<String>) -> Self {
        Self {
            sessions,
            messages,
            provider,
            model: model.into(),
            temperature: None,
        }
    }

    /// Sampling temperature for reply generation. Unset leaves the model default.
    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    pub fn messages(&self) -> &M {
        &self.messages
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run one turn: persist the prompt, generate and persist the reply, and
    /// name the session if it was just opened.
    ///
    /// A model failure during the reply leaves the user message committed
    /// and no AI message written.
    #[tracing::instrument(name = "chat_turn", skip(self, prompt), fields(model = %self.model))]
    pub async fn handle_chat_turn(
        &self,
        prompt: &str,
        session_id: Option<Uuid>,
    ) -> Result<ChatReply, ChatError> {
        let (mut session, is_new) = match session_id {
            None => {
                let session = self.sessions.create(NewSession::new(PROVISIONAL_TITLE)).await?;
                info!(session_id = %session.id, "opened new session");
                (session, true)
            }
            Some(id) => {
                let session = self
                    .sessions
                    .get(&id)
                    .await?
                    .ok_or(ChatError::SessionNotFound(id))?;
                (session, false)
            }
        };

        self.messages
            .create_bound_to_session(MessageDraft::user(prompt), session.id)
            .await?;

        let history = self.messages.list_by_session(&session.id).await?;
        let reply = self.collect_reply(self.reply_request(&history)).await?;

        self.messages
            .create_bound_to_session(MessageDraft::ai(reply.as_str()), session.id)
            .await?;

        if is_new {
            let title = generate_title(&self.provider, prompt, &self.model).await;
            session = self.sessions.update(&session, SessionUpdate::title(title)).await?;
        }
        session = self.sessions.update(&session, SessionUpdate::touch()).await?;

        debug!(
            session_id = %session.id,
            history_len = history.len(),
            reply_len = reply.len(),
            "chat turn complete"
        );

        Ok(ChatReply {
            reply,
            session_id: session.id,
            session_title: session.title,
        })
    }

    fn reply_request(&self, history: &[Message]) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: history
                .iter()
                .map(|m| LlmMessage {
                    role: m.role.into(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: None,
            temperature: self.temperature,
            stream: true,
        }
    }

    /// Drain the reply stream, concatenating text fragments in arrival order.
    async fn collect_reply(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let mut stream = self.provider.stream(request);
        let mut reply = String::new();

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::TextDelta { text } => reply.push_str(&text),
                StreamEvent::Usage(usage) => debug!(
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "reply usage"
                ),
                StreamEvent::Done => break,
                StreamEvent::Connected => {}
            }
        }

        if reply.is_empty() {
            warn!(provider = self.provider.name(), "model returned an empty reply");
        }
        Ok(reply)
    }

    /// Sessions bucketed into Today, Yesterday and Previous 30 Days by the
    /// local calendar date they were created on. An empty keyword lists all;
    /// any other keyword is matched as given.
    pub async fn list_sessions_grouped(
        &self,
        keyword: Option<&str>,
    ) -> Result<GroupedSessions, ChatError> {
        let sessions = match keyword.filter(|k| !k.is_empty()) {
            Some(keyword) => self.sessions.search_by_title(keyword).await?,
            None => self.sessions.list_all_by_recency().await?,
        };
        Ok(group_by_recency(&sessions, &Local::now()))
    }

    /// A session with its messages, oldest first.
    pub async fn get_session_history(&self, session_id: Uuid) -> Result<SessionHistory, ChatError> {
        let session = self.require_session(session_id).await?;
        let chat_history = self.messages.list_by_session(&session.id).await?;
        Ok(SessionHistory {
            id: session.id,
            title: session.title,
            chat_history,
        })
    }

    pub async fn rename_session(
        &self,
        session_id: Uuid,
        title: impl Into<String>,
    ) -> Result<Session, ChatError> {
        let session = self.require_session(session_id).await?;
        Ok(self.sessions.update(&session, SessionUpdate::title(title)).await?)
    }

    /// Delete a session and, with it, every message it holds.
    pub async fn delete_session(&self, session_id: Uuid) -> Result<Session, ChatError> {
        let removed = self
            .sessions
            .remove(&session_id)
            .await?
            .ok_or(ChatError::SessionNotFound(session_id))?;
        info!(session_id = %removed.id, "deleted session");
        Ok(removed)
    }

    async fn require_session(&self, session_id: Uuid) -> Result<Session, ChatError> {
        self.sessions
            .get(&session_id)
            .await?
            .ok_or(ChatError::SessionNotFound(session_id))
    }
}
