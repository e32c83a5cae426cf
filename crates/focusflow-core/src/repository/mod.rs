//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (focusflow-infra) implements. The core crate never depends on any
//! specific storage technology.
//!
//! [`Repository`] is the generic CRUD contract shared by every entity kind;
//! [`session::SessionRepository`] and [`message::MessageRepository`] extend it
//! with the queries the chat workflow needs.

pub mod message;
pub mod session;

use std::future::Future;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use focusflow_types::error::RepositoryError;

/// A sparse set of field changes for one entity kind.
///
/// Each field is optional; unset fields are left alone. A change set can be
/// built directly or decoded from a raw JSON field map.
pub trait ChangeSet: DeserializeOwned + Default + Send + Sync {
    /// True when no field would change.
    fn is_empty(&self) -> bool;

    /// Decode a raw `field -> value` map. Unknown fields are rejected.
    fn from_fields(fields: Map<String, Value>) -> Result<Self, RepositoryError> {
        serde_json::from_value(Value::Object(fields))
            .map_err(|e| RepositoryError::InvalidChanges(e.to_string()))
    }
}

/// An entity kind persisted in its own table.
///
/// Entities apply their own change sets explicitly; repositories never set
/// fields by name.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Send + Sync;
    /// Caller-supplied fields for `create`.
    type Create: Send;
    type Update: ChangeSet;

    fn id(&self) -> &Self::Id;

    /// Copy every set field of `changes` onto `self`.
    fn apply(&mut self, changes: &Self::Update);
}

/// Generic create/read/update/delete contract over one entity kind.
///
/// Every operation commits before returning. Store failures propagate
/// as [`RepositoryError`]; nothing is retried.
pub trait Repository<E: Entity>: Send + Sync {
    /// Point lookup. `Ok(None)` when no row matches.
    fn get(
        &self,
        id: &E::Id,
    ) -> impl Future<Output = Result<Option<E>, RepositoryError>> + Send;

    /// Offset/limit page in storage order.
    fn list(
        &self,
        skip: u32,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<E>, RepositoryError>> + Send;

    /// Insert a new row; returns it with generated id and timestamps.
    fn create(
        &self,
        fields: E::Create,
    ) -> impl Future<Output = Result<E, RepositoryError>> + Send;

    /// Apply `changes` to an already-loaded entity and return the refreshed row.
    ///
    /// An empty change set still writes, so entities with an `updated_at`
    /// column get it refreshed.
    fn update(
        &self,
        existing: &E,
        changes: E::Update,
    ) -> impl Future<Output = Result<E, RepositoryError>> + Send;

    /// Delete by id. Returns the removed entity, or `None` if nothing matched.
    fn remove(
        &self,
        id: &E::Id,
    ) -> impl Future<Output = Result<Option<E>, RepositoryError>> + Send;
}
