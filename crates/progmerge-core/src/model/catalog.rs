//! Conference-wide entities that groups reference.

use serde::{Deserialize, Serialize};

use super::entity::{impl_entity, EntityKind};
use crate::matching::Matchable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_new: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Link to the attendee registration of this person, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrant_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originating_data_source_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_new: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originating_data_source_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exhibition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_new: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originating_data_source_id: Option<String>,
}

/// Provenance payload: the raw record an import source delivered, keyed by source id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginatingData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_new: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Physical or virtual space in which exhibitions are laid out
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hallway {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_new: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl_entity!(Person, EntityKind::Person);
impl_entity!(Tag, EntityKind::Tag);
impl_entity!(Exhibition, EntityKind::Exhibition);
impl_entity!(OriginatingData, EntityKind::OriginatingData);
impl_entity!(Hallway, EntityKind::Hallway);

impl Matchable for Person {
    fn match_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn cross_reference(&self) -> Option<&str> {
        self.originating_data_source_id.as_deref()
    }

    fn match_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Matchable for Tag {
    fn match_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn cross_reference(&self) -> Option<&str> {
        self.originating_data_source_id.as_deref()
    }

    fn match_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Matchable for Exhibition {
    fn match_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn cross_reference(&self) -> Option<&str> {
        self.originating_data_source_id.as_deref()
    }

    fn match_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Matchable for OriginatingData {
    fn match_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn cross_reference(&self) -> Option<&str> {
        self.source_id.as_deref()
    }
}

impl Matchable for Hallway {
    fn match_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn match_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
