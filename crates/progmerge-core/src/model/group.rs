use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::entity::{impl_entity, EntityKind};
use crate::matching::Matchable;

/// Program item: a session, paper, poster, or any other schedulable group of content.
///
/// Every field besides `is_new` is optional so that "absent" and "empty" stay
/// distinguishable through merge and save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Client-only descriptor, not yet persisted
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_new: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Composite provenance: source ids joined by `¬`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originating_data_source_id: Option<String>,

    /// Ids of linked tags (persisted as group-tag links)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<BTreeSet<String>>,

    /// Tag names carried by import descriptors; resolved into `tag_ids` after merge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_names: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<Element>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_items: Option<Vec<RequiredItem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people: Option<Vec<GroupPerson>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhibitions: Option<Vec<GroupExhibition>>,
}

impl Group {
    /// Create an id-less import descriptor with a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Copy of the group without nested child collections.
    ///
    /// This is the shape sent in a group's own update patch.
    pub fn scalar_fields(&self) -> Group {
        Group {
            id: self.id.clone(),
            is_new: self.is_new,
            title: self.title.clone(),
            short_title: self.short_title.clone(),
            type_name: self.type_name.clone(),
            description: self.description.clone(),
            originating_data_source_id: self.originating_data_source_id.clone(),
            ..Group::default()
        }
    }
}

/// Typed content unit within a group (abstract, slides, video link, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_new: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    /// Type-specific payload, opaque to the merge engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hidden: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originating_data_source_id: Option<String>,
}

/// Pending-upload slot: content the organisers still expect from someone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_new: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploads_remaining: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaders: Option<Vec<Uploader>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originating_data_source_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Uploader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_new: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Number of upload-request emails already sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails_sent_count: Option<i64>,
}

/// Link between a group and a person, with the person's role in that group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPerson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_new: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,

    /// Person name as given by the import; resolved into `person_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

/// Link between a group and an exhibition it is shown in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupExhibition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_new: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhibition_id: Option<String>,

    /// Exhibition name as given by the import; resolved into `exhibition_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhibition_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl_entity!(Group, EntityKind::Group);
impl_entity!(Element, EntityKind::Element);
impl_entity!(RequiredItem, EntityKind::RequiredItem);
impl_entity!(Uploader, EntityKind::Uploader);
impl_entity!(GroupPerson, EntityKind::GroupPerson);
impl_entity!(GroupExhibition, EntityKind::GroupExhibition);

impl Matchable for Group {
    fn match_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn cross_reference(&self) -> Option<&str> {
        self.originating_data_source_id.as_deref()
    }

    fn match_name(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

impl Matchable for Element {
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

impl Matchable for RequiredItem {
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

impl Matchable for Uploader {
    fn match_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn match_name(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

impl Matchable for GroupPerson {
    fn match_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn match_name(&self) -> Option<&str> {
        self.person_name.as_deref()
    }
}

impl Matchable for GroupExhibition {
    fn match_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn match_name(&self) -> Option<&str> {
        self.exhibition_name.as_deref()
    }
}
