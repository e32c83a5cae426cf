//! In-memory fakes for exercising core logic without SQLite or a model server.

use std::pin::Pin;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures_util::Stream;
use uuid::Uuid;

use focusflow_types::error::RepositoryError;
use focusflow_types::llm::{CompletionRequest, CompletionResponse, LlmError, StreamEvent, Usage};
use focusflow_types::message::{Message, NewMessage};
use focusflow_types::session::{NewSession, Session};

use crate::llm::provider::LlmProvider;
use crate::repository::message::MessageRepository;
use crate::repository::session::SessionRepository;
use crate::repository::{Entity, Repository};

#[derive(Default)]
struct Tables {
    sessions: Vec<Session>,
    messages: Vec<Message>,
}

/// Shared in-memory tables. Rows keep insertion order, like SQLite rowids.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> MemorySessions {
        MemorySessions { store: self.clone() }
    }

    pub fn messages(&self) -> MemoryMessages {
        MemoryMessages { store: self.clone() }
    }

    pub fn session_count(&self) -> usize {
        self.tables.lock().unwrap().sessions.len()
    }

    pub fn message_count(&self) -> usize {
        self.tables.lock().unwrap().messages.len()
    }

    /// Insert a session with explicit timestamps.
    pub fn seed_session(&self, session: Session) {
        self.tables.lock().unwrap().sessions.push(session);
    }
}

pub struct MemorySessions {
    store: MemoryStore,
}

pub struct MemoryMessages {
    store: MemoryStore,
}

fn page<T: Clone>(rows: &[T], skip: u32, limit: u32) -> Vec<T> {
    rows.iter()
        .skip(skip as usize)
        .take(limit as usize)
        .cloned()
        .collect()
}

impl MemorySessions {
    fn by_recency(&self, keep: impl Fn(&Session) -> bool) -> Vec<Session> {
        let tables = self.store.tables.lock().unwrap();
        let mut rows: Vec<Session> = tables.sessions.iter().filter(|s| keep(s)).cloned().collect();
        // Reverse first so the stable sort leaves later inserts ahead on ties.
        rows.reverse();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        rows
    }
}

impl Repository<Session> for MemorySessions {
    async fn get(&self, id: &Uuid) -> Result<Option<Session>, RepositoryError> {
        let tables = self.store.tables.lock().unwrap();
        Ok(tables.sessions.iter().find(|s| &s.id == id).cloned())
    }

    async fn list(&self, skip: u32, limit: u32) -> Result<Vec<Session>, RepositoryError> {
        let tables = self.store.tables.lock().unwrap();
        Ok(page(&tables.sessions, skip, limit))
    }

    async fn create(&self, fields: NewSession) -> Result<Session, RepositoryError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::now_v7(),
            title: fields.title,
            created_at: now,
            updated_at: now,
        };
        self.store.tables.lock().unwrap().sessions.push(session.clone());
        Ok(session)
    }

    async fn update(
        &self,
        existing: &Session,
        changes: focusflow_types::session::SessionUpdate,
    ) -> Result<Session, RepositoryError> {
        let mut tables = self.store.tables.lock().unwrap();
        let row = tables
            .sessions
            .iter_mut()
            .find(|s| s.id == existing.id)
            .ok_or(RepositoryError::NotFound)?;
        row.apply(&changes);
        row.updated_at = row.updated_at.max(Utc::now());
        Ok(row.clone())
    }

    async fn remove(&self, id: &Uuid) -> Result<Option<Session>, RepositoryError> {
        let mut tables = self.store.tables.lock().unwrap();
        let Some(pos) = tables.sessions.iter().position(|s| &s.id == id) else {
            return Ok(None);
        };
        tables.messages.retain(|m| &m.session_id != id);
        Ok(Some(tables.sessions.remove(pos)))
    }
}

impl SessionRepository for MemorySessions {
    async fn list_all_by_recency(&self) -> Result<Vec<Session>, RepositoryError> {
        Ok(self.by_recency(|_| true))
    }

    async fn search_by_title(&self, keyword: &str) -> Result<Vec<Session>, RepositoryError> {
        let needle = keyword.to_lowercase();
        Ok(self.by_recency(|s| s.title.to_lowercase().contains(&needle)))
    }
}

impl Repository<Message> for MemoryMessages {
    async fn get(&self, id: &Uuid) -> Result<Option<Message>, RepositoryError> {
        let tables = self.store.tables.lock().unwrap();
        Ok(tables.messages.iter().find(|m| &m.id == id).cloned())
    }

    async fn list(&self, skip: u32, limit: u32) -> Result<Vec<Message>, RepositoryError> {
        let tables = self.store.tables.lock().unwrap();
        Ok(page(&tables.messages, skip, limit))
    }

    async fn create(&self, fields: NewMessage) -> Result<Message, RepositoryError> {
        let mut tables = self.store.tables.lock().unwrap();
        if !tables.sessions.iter().any(|s| s.id == fields.session_id) {
            return Err(RepositoryError::ForeignKey(format!(
                "session {} does not exist",
                fields.session_id
            )));
        }
        let message = Message {
            id: Uuid::now_v7(),
            session_id: fields.session_id,
            role: fields.role,
            content: fields.content,
            created_at: Utc::now(),
        };
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn update(
        &self,
        existing: &Message,
        changes: focusflow_types::message::MessageUpdate,
    ) -> Result<Message, RepositoryError> {
        let mut tables = self.store.tables.lock().unwrap();
        let row = tables
            .messages
            .iter_mut()
            .find(|m| m.id == existing.id)
            .ok_or(RepositoryError::NotFound)?;
        row.apply(&changes);
        Ok(row.clone())
    }

    async fn remove(&self, id: &Uuid) -> Result<Option<Message>, RepositoryError> {
        let mut tables = self.store.tables.lock().unwrap();
        let Some(pos) = tables.messages.iter().position(|m| &m.id == id) else {
            return Ok(None);
        };
        Ok(Some(tables.messages.remove(pos)))
    }
}

impl MessageRepository for MemoryMessages {
    async fn list_by_session(&self, session_id: &Uuid) -> Result<Vec<Message>, RepositoryError> {
        let tables = self.store.tables.lock().unwrap();
        let mut rows: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| &m.session_id == session_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }
}

/// Model fake that streams fixed fragments and answers title calls with a fixed string.
pub struct ScriptedProvider {
    fragments: Vec<String>,
    title: String,
    fail_title: bool,
    fail_stream: bool,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    pub fn new(fragments: &[&str], title: &str) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            title: title.to_string(),
            fail_title: false,
            fail_stream: false,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Title calls return a provider error.
    pub fn failing_title(mut self) -> Self {
        self.fail_title = true;
        self
    }

    /// The reply stream errors after its first fragment.
    pub fn failing_stream(mut self) -> Self {
        self.fail_stream = true;
        self
    }

    /// Handle onto every request this provider receives.
    pub fn recorder(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_title {
            return Err(LlmError::Provider {
                message: "title model offline".to_string(),
            });
        }
        Ok(CompletionResponse {
            content: self.title.clone(),
            model: request.model.clone(),
            usage: Usage::default(),
        })
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        self.requests.lock().unwrap().push(request);

        let mut events = vec![Ok(StreamEvent::Connected)];
        for (i, fragment) in self.fragments.iter().enumerate() {
            if self.fail_stream && i == 1 {
                break;
            }
            events.push(Ok(StreamEvent::TextDelta {
                text: fragment.clone(),
            }));
        }
        if self.fail_stream {
            events.push(Err(LlmError::Stream("connection reset".to_string())));
        } else {
            events.push(Ok(StreamEvent::Usage(Usage {
                input_tokens: 3,
                output_tokens: self.fragments.len() as u32,
            })));
            events.push(Ok(StreamEvent::Done));
        }
        Box::pin(futures_util::stream::iter(events))
    }
}
