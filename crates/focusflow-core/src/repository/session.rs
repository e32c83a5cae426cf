//! Session repository port.

use std::future::Future;

use uuid::Uuid;

use focusflow_types::error::RepositoryError;
use focusflow_types::session::{NewSession, Session, SessionUpdate};

use super::{ChangeSet, Entity, Repository};

impl ChangeSet for SessionUpdate {
    fn is_empty(&self) -> bool {
        self.title.is_none()
    }
}

impl Entity for Session {
    type Id = Uuid;
    type Create = NewSession;
    type Update = SessionUpdate;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn apply(&mut self, changes: &SessionUpdate) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
    }
}

/// Session persistence with recency-ordered queries.
pub trait SessionRepository: Repository<Session> {
    /// All sessions, most recently updated first.
    fn list_all_by_recency(
        &self,
    ) -> impl Future<Output = Result<Vec<Session>, RepositoryError>> + Send;

    /// Sessions whose title contains `keyword`, ignoring case, most recently
    /// updated first. An empty keyword matches every session.
    fn search_by_title(
        &self,
        keyword: &str,
    ) -> impl Future<Output = Result<Vec<Session>, RepositoryError>> + Send;
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_apply_title_change() {
        let now = Utc::now();
        let mut session = Session {
            id: Uuid::now_v7(),
            title: "New Conversation".to_string(),
            created_at: now,
            updated_at: now,
        };

        session.apply(&SessionUpdate::touch());
        assert_eq!(session.title, "New Conversation");

        session.apply(&SessionUpdate::title("Docker basics"));
        assert_eq!(session.title, "Docker basics");
        assert_eq!(session.updated_at, now);
    }

    #[test]
    fn test_change_set_from_fields() {
        let fields = json!({"title": "Renamed"});
        let update = SessionUpdate::from_fields(fields.as_object().unwrap().clone()).unwrap();
        assert_eq!(update.title.as_deref(), Some("Renamed"));
        assert!(!update.is_empty());

        let empty = SessionUpdate::from_fields(Default::default()).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_change_set_rejects_unknown_field() {
        let fields = json!({"created_at": "2024-01-01T00:00:00Z"});
        let err = SessionUpdate::from_fields(fields.as_object().unwrap().clone()).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidChanges(_)));
    }
}
