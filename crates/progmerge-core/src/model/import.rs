use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::catalog::{Hallway, OriginatingData, Person};
use super::group::Group;

/// Entities delivered by one import source, before merge.
///
/// Every collection is optional: a source that never mentions people must not
/// be confused with one that explicitly delivers none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediaryData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Group>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hallways: Option<Vec<Hallway>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people: Option<Vec<Person>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originating_datas: Option<Vec<OriginatingData>>,
}

impl IntermediaryData {
    pub fn is_empty(&self) -> bool {
        self.groups.as_ref().map_or(true, Vec::is_empty)
            && self.hallways.as_ref().map_or(true, Vec::is_empty)
            && self.people.as_ref().map_or(true, Vec::is_empty)
            && self.originating_datas.as_ref().map_or(true, Vec::is_empty)
    }
}

/// Import payload: source name → entities from that source.
///
/// Sources are folded in key order (see `merge::hierarchy::fold_sources`).
pub type ImportPayload = BTreeMap<String, IntermediaryData>;
