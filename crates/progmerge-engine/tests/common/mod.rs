// Shared fixtures for save integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use progmerge_core::errors::{ExError, ExErrorKind};
use progmerge_core::model::{EntityKind, Group, Snapshot, Tag};
use progmerge_engine::{MutationGateway, SnapshotReader};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One recorded gateway call
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub op: &'static str,
    pub kind: EntityKind,
    pub parent_id: Option<String>,
    pub keys: Vec<String>,
    pub payloads: Vec<Value>,
}

/// In-memory gateway that records every call and fails on request
#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<Call>>,
    failing: BTreeSet<(&'static str, EntityKind)>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `op` call for `kind` fail
    pub fn failing(mut self, op: &'static str, kind: EntityKind) -> Self {
        self.failing.insert((op, kind));
        self
    }

    /// Hold each call open for `delay` so overlapping calls can be observed
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Position of the first call matching `op` and `kind`
    pub fn position(&self, op: &str, kind: EntityKind) -> Option<usize> {
        self.calls()
            .iter()
            .position(|call| call.op == op && call.kind == kind)
    }

    async fn handle(
        &self,
        op: &'static str,
        kind: EntityKind,
        parent_id: Option<&str>,
        keys: Vec<String>,
        payloads: Vec<Value>,
    ) -> Result<(), ExError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        self.calls.lock().unwrap().push(Call {
            op,
            kind,
            parent_id: parent_id.map(str::to_string),
            keys,
            payloads,
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.failing.contains(&(op, kind)) {
            return Err(ExError::new(ExErrorKind::Persistence)
                .with_op(op)
                .with_entity_kind(kind.location())
                .with_message("injected failure"));
        }
        Ok(())
    }
}

fn payload_id(value: &Value) -> String {
    value
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl MutationGateway for RecordingGateway {
    async fn insert(
        &self,
        kind: EntityKind,
        parent_id: Option<&str>,
        objects: Vec<Value>,
    ) -> Result<Vec<Value>, ExError> {
        let keys = objects.iter().map(payload_id).collect();
        self.handle("insert", kind, parent_id, keys, objects.clone())
            .await?;
        Ok(objects)
    }

    async fn update(&self, kind: EntityKind, id: &str, patch: Value) -> Result<Value, ExError> {
        self.handle("update", kind, None, vec![id.to_string()], vec![patch.clone()])
            .await?;
        Ok(patch)
    }

    async fn delete(
        &self,
        kind: EntityKind,
        parent_id: Option<&str>,
        ids: Vec<String>,
    ) -> Result<Vec<String>, ExError> {
        self.handle("delete", kind, parent_id, ids.clone(), Vec::new())
            .await?;
        Ok(ids)
    }

    async fn insert_and_delete(
        &self,
        kind: EntityKind,
        insert: Vec<Value>,
        delete: Vec<String>,
    ) -> Result<(), ExError> {
        let mut keys: Vec<String> = insert.iter().map(payload_id).collect();
        keys.extend(delete);
        self.handle("insert_and_delete", kind, None, keys, insert)
            .await
    }
}

/// Reader returning a fixed snapshot, or failing
pub struct StaticReader {
    snapshot: Option<Snapshot>,
}

impl StaticReader {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
        }
    }

    pub fn unavailable() -> Self {
        Self { snapshot: None }
    }
}

#[async_trait]
impl SnapshotReader for StaticReader {
    async fn load_snapshot(&self, conference_id: &str) -> Result<Snapshot, ExError> {
        self.snapshot.clone().ok_or_else(|| {
            ExError::new(ExErrorKind::ExternalService)
                .with_op("load_snapshot")
                .with_entity_id(conference_id)
                .with_message("snapshot store unavailable")
        })
    }
}

pub fn tag(id: &str, name: &str, is_new: bool) -> Tag {
    Tag {
        id: Some(id.to_string()),
        is_new,
        name: Some(name.to_string()),
        ..Tag::default()
    }
}

pub fn group(id: &str, title: &str, is_new: bool) -> Group {
    Group {
        id: Some(id.to_string()),
        is_new,
        title: Some(title.to_string()),
        ..Group::default()
    }
}

pub fn keys(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}
