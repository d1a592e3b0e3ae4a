//! Tiered execution of a save plan.

use futures::future::{join_all, ready, BoxFuture, FutureExt};
use progmerge_core::diff::{persist_payload, EntityDiff, GroupUpdatePlan, Keyed, SavePlan};
use progmerge_core::errors::{ExError, ExErrorKind};
use progmerge_core::model::{Entity, EntityKind};
use progmerge_core::{log_op_end, log_op_error, log_op_start};
use progmerge_core_types::RequestId;
use serde::Serialize;
use serde_json::{json, Value};
use std::future::Future;
use std::time::Instant;

use super::result::SaveResult;
use crate::concurrency::ConcurrencyLimiter;
use crate::gateway::MutationGateway;

pub(crate) struct SaveExecutor<'a> {
    gateway: &'a dyn MutationGateway,
    limiter: ConcurrencyLimiter,
    request_id: RequestId,
}

impl<'a> SaveExecutor<'a> {
    pub(crate) fn new(
        gateway: &'a dyn MutationGateway,
        limiter: ConcurrencyLimiter,
        request_id: RequestId,
    ) -> Self {
        Self {
            gateway,
            limiter,
            request_id,
        }
    }

    fn tagged(&self, err: impl Into<ExError>) -> ExError {
        err.into().with_request_id(self.request_id.clone())
    }

    /// Keys whose entity id disagrees with the snapshot key are never sent.
    fn reject(&self, kind: EntityKind, keys: &[String], result: &mut SaveResult) {
        for key in keys {
            let err = self.tagged(
                ExError::new(ExErrorKind::InvalidInput)
                    .with_entity_kind(kind.location())
                    .with_entity_id(key.as_str())
                    .with_message("entity id does not match its snapshot key"),
            );
            log_op_error!(
                "save_entity",
                err,
                duration_ms = 0_u64,
                request_id = self.request_id.as_str(),
                entity_kind = kind.location()
            );
        }
        result.record(kind, keys.iter().cloned(), false);
    }

    pub(crate) async fn run(&self, plan: &SavePlan) -> SaveResult {
        let mut result = SaveResult::default();

        // Tier 1: entities groups may reference
        let (tags, originating_datas, people, exhibitions) = futures::join!(
            self.upsert(EntityKind::Tag, &plan.tags),
            self.upsert(EntityKind::OriginatingData, &plan.originating_datas),
            self.upsert(EntityKind::Person, &plan.people),
            self.upsert(EntityKind::Exhibition, &plan.exhibitions),
        );
        result.absorb(tags);
        result.absorb(originating_datas);
        result.absorb(people);
        result.absorb(exhibitions);

        // Tier 2: groups
        result.absorb(self.save_groups(plan).await);

        // Tier 3: deletions deferred until no group can still reference them
        let deletions = join_all([
            self.delete_all(EntityKind::Tag, &plan.tags.deleted),
            self.delete_all(EntityKind::OriginatingData, &plan.originating_datas.deleted),
            self.delete_all(EntityKind::Person, &plan.people.deleted),
            self.delete_all(EntityKind::Exhibition, &plan.exhibitions.deleted),
        ])
        .await;
        for deleted in deletions {
            result.absorb(deleted);
        }

        result
    }

    /// One gateway call under a concurrency permit, with its own log events.
    async fn call<R, F, Fut>(
        &self,
        op: &'static str,
        kind: EntityKind,
        key_count: usize,
        mutation: F,
    ) -> Result<R, ExError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, ExError>>,
    {
        let request_id = self.request_id.as_str();
        log_op_start!(
            op,
            request_id = request_id,
            entity_kind = kind.location(),
            key_count = key_count
        );
        let start = Instant::now();

        let outcome = match self.limiter.acquire().await {
            Ok(permit) => {
                let outcome = mutation().await;
                drop(permit);
                outcome
            }
            Err(err) => Err(err),
        };

        match &outcome {
            Ok(_) => {
                log_op_end!(
                    op,
                    duration_ms = start.elapsed().as_millis() as u64,
                    request_id = request_id,
                    entity_kind = kind.location(),
                    key_count = key_count
                );
            }
            Err(err) => {
                log_op_error!(
                    op,
                    self.tagged(err.clone()),
                    duration_ms = start.elapsed().as_millis() as u64,
                    request_id = request_id,
                    entity_kind = kind.location(),
                    key_count = key_count
                );
            }
        }
        outcome
    }

    /// Bulk insert of new entities alongside concurrent individual updates.
    async fn upsert<T>(&self, kind: EntityKind, diff: &EntityDiff<Keyed<T>>) -> SaveResult
    where
        T: Entity + Serialize,
    {
        let mut result = SaveResult::default();
        self.reject(kind, &diff.rejected, &mut result);
        let new_keys: Vec<String> = diff.new.iter().map(|keyed| keyed.key.clone()).collect();

        let insert = async {
            if diff.new.is_empty() {
                return true;
            }
            match payloads(diff.new.iter().map(|keyed| &keyed.entity)) {
                Ok(objects) => self
                    .call("insert", kind, objects.len(), || {
                        self.gateway.insert(kind, None, objects)
                    })
                    .await
                    .is_ok(),
                Err(err) => {
                    log_op_error!(
                        "insert",
                        self.tagged(err),
                        duration_ms = 0_u64,
                        entity_kind = kind.location()
                    );
                    false
                }
            }
        };

        let updates = join_all(diff.updated.iter().map(|keyed| async move {
            let id = keyed.key.as_str();
            let ok = match persist_payload(&keyed.entity) {
                Ok(payload) => self
                    .call("update", kind, 1, || self.gateway.update(kind, id, payload))
                    .await
                    .is_ok(),
                Err(err) => {
                    log_op_error!(
                        "update",
                        self.tagged(err),
                        duration_ms = 0_u64,
                        entity_kind = kind.location()
                    );
                    false
                }
            };
            (id, ok)
        }));

        let (inserted, updated) = futures::join!(insert, updates);
        result.record(kind, new_keys, inserted);
        for (id, ok) in updated {
            result.record(kind, [id], ok);
        }
        result
    }

    async fn delete_all(&self, kind: EntityKind, ids: &[String]) -> SaveResult {
        let mut result = SaveResult::default();
        if ids.is_empty() {
            return result;
        }
        let ok = self
            .call("delete", kind, ids.len(), || {
                self.gateway.delete(kind, None, ids.to_vec())
            })
            .await
            .is_ok();
        result.record(kind, ids.iter().cloned(), ok);
        result
    }

    async fn save_groups(&self, plan: &SavePlan) -> SaveResult {
        let mut result = SaveResult::default();
        self.reject(EntityKind::Group, &plan.rejected_groups, &mut result);

        let bulk = async {
            if plan.new_groups.is_empty() && plan.deleted_groups.is_empty() {
                return true;
            }
            match payloads(plan.new_groups.iter().map(|keyed| &keyed.entity)) {
                Ok(objects) => {
                    let key_count = objects.len() + plan.deleted_groups.len();
                    self.call("insert_and_delete", EntityKind::Group, key_count, || {
                        self.gateway.insert_and_delete(
                            EntityKind::Group,
                            objects,
                            plan.deleted_groups.clone(),
                        )
                    })
                    .await
                    .is_ok()
                }
                Err(err) => {
                    log_op_error!(
                        "insert_and_delete",
                        self.tagged(err),
                        duration_ms = 0_u64,
                        entity_kind = EntityKind::Group.location()
                    );
                    false
                }
            }
        };

        let updates = join_all(
            plan.updated_groups
                .iter()
                .map(|group| async move { (group.id.clone(), self.update_group(group).await) }),
        );

        let (bulk_ok, updated) = futures::join!(bulk, updates);
        result.record(
            EntityKind::Group,
            plan.new_groups.iter().map(|keyed| keyed.key.as_str()),
            bulk_ok,
        );
        result.record(EntityKind::Group, plan.deleted_groups.iter().cloned(), bulk_ok);
        for (id, ok) in updated {
            result.record(EntityKind::Group, [id], ok);
        }
        result
    }

    /// Patch the group's own fields and apply every child sub-diff concurrently.
    async fn update_group(&self, group: &GroupUpdatePlan) -> bool {
        if group.is_noop() {
            return true;
        }
        let group_id = group.id.as_str();
        let mut ops: Vec<BoxFuture<'_, bool>> = Vec::new();

        if let Some(patch) = &group.patch {
            let patch = patch.clone();
            ops.push(
                async move {
                    self.call("update", EntityKind::Group, 1, || {
                        self.gateway.update(EntityKind::Group, group_id, patch)
                    })
                    .await
                    .is_ok()
                }
                .boxed(),
            );
        }

        self.child_ops(EntityKind::Element, group_id, &group.elements, &mut ops);
        self.child_ops(EntityKind::RequiredItem, group_id, &group.required_items, &mut ops);
        self.child_ops(EntityKind::GroupPerson, group_id, &group.people, &mut ops);
        self.child_ops(EntityKind::GroupExhibition, group_id, &group.exhibitions, &mut ops);

        if !group.tags.added.is_empty() {
            let links: Vec<Value> = group
                .tags
                .added
                .iter()
                .map(|tag_id| json!({ "tagId": tag_id }))
                .collect();
            ops.push(
                async move {
                    self.call("insert", EntityKind::GroupTag, links.len(), || {
                        self.gateway.insert(EntityKind::GroupTag, Some(group_id), links)
                    })
                    .await
                    .is_ok()
                }
                .boxed(),
            );
        }
        if !group.tags.removed.is_empty() {
            let removed = group.tags.removed.clone();
            ops.push(
                async move {
                    self.call("delete", EntityKind::GroupTag, removed.len(), || {
                        self.gateway.delete(EntityKind::GroupTag, Some(group_id), removed)
                    })
                    .await
                    .is_ok()
                }
                .boxed(),
            );
        }

        join_all(ops).await.into_iter().all(|ok| ok)
    }

    fn child_ops<'s, T>(
        &'s self,
        kind: EntityKind,
        group_id: &'s str,
        diff: &EntityDiff<T>,
        ops: &mut Vec<BoxFuture<'s, bool>>,
    ) where
        T: Entity + Serialize,
    {
        if !diff.new.is_empty() {
            match payloads(&diff.new) {
                Ok(objects) => ops.push(
                    async move {
                        self.call("insert", kind, objects.len(), || {
                            self.gateway.insert(kind, Some(group_id), objects)
                        })
                        .await
                        .is_ok()
                    }
                    .boxed(),
                ),
                Err(err) => {
                    log_op_error!(
                        "insert",
                        self.tagged(err),
                        duration_ms = 0_u64,
                        entity_kind = kind.location()
                    );
                    ops.push(ready(false).boxed());
                }
            }
        }

        for child in &diff.updated {
            let Some(id) = child.id().map(str::to_string) else {
                continue;
            };
            match persist_payload(child) {
                Ok(payload) => ops.push(
                    async move {
                        self.call("update", kind, 1, || self.gateway.update(kind, &id, payload))
                            .await
                            .is_ok()
                    }
                    .boxed(),
                ),
                Err(err) => {
                    log_op_error!(
                        "update",
                        self.tagged(err),
                        duration_ms = 0_u64,
                        entity_kind = kind.location()
                    );
                    ops.push(ready(false).boxed());
                }
            }
        }

        if !diff.deleted.is_empty() {
            let ids = diff.deleted.clone();
            ops.push(
                async move {
                    self.call("delete", kind, ids.len(), || {
                        self.gateway.delete(kind, Some(group_id), ids)
                    })
                    .await
                    .is_ok()
                }
                .boxed(),
            );
        }
    }
}

fn payloads<'e, T, I>(entities: I) -> progmerge_core::Result<Vec<Value>>
where
    T: Serialize + 'e,
    I: IntoIterator<Item = &'e T>,
{
    entities.into_iter().map(persist_payload).collect()
}
