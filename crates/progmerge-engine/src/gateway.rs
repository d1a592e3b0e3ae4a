//! Storage collaborators.
//!
//! The engine never talks to a database directly: it reads the last persisted
//! snapshot through a [`SnapshotReader`] and issues mutations through a
//! [`MutationGateway`]. Payloads are camelCase JSON objects without the
//! client-only `isNew` flag.

use async_trait::async_trait;
use progmerge_core::errors::ExError;
use progmerge_core::model::{EntityKind, Snapshot};
use serde_json::Value;

/// Read side: loads the persisted state of one conference.
#[async_trait]
pub trait SnapshotReader: Send + Sync {
    async fn load_snapshot(&self, conference_id: &str) -> Result<Snapshot, ExError>;
}

/// Write side: one method per mutation shape.
///
/// `parent_id` scopes child kinds (elements, required items, group people,
/// group exhibitions, group-tag links) to their group; top-level kinds pass `None`.
#[async_trait]
pub trait MutationGateway: Send + Sync {
    /// Bulk insert; returns the stored objects
    async fn insert(
        &self,
        kind: EntityKind,
        parent_id: Option<&str>,
        objects: Vec<Value>,
    ) -> Result<Vec<Value>, ExError>;

    /// Update one entity with a (possibly partial) payload
    async fn update(&self, kind: EntityKind, id: &str, patch: Value) -> Result<Value, ExError>;

    /// Bulk delete by id; returns the deleted ids
    async fn delete(
        &self,
        kind: EntityKind,
        parent_id: Option<&str>,
        ids: Vec<String>,
    ) -> Result<Vec<String>, ExError>;

    /// Insert and delete in a single mutation (used for groups)
    async fn insert_and_delete(
        &self,
        kind: EntityKind,
        insert: Vec<Value>,
        delete: Vec<String>,
    ) -> Result<(), ExError>;
}
