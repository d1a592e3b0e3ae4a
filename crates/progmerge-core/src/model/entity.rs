use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every entity kind the merge and save phases know about.
///
/// `location()` is the table name used in change-summary locations and
/// persistence calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Group,
    Element,
    RequiredItem,
    Uploader,
    GroupPerson,
    GroupExhibition,
    GroupTag,
    Person,
    Tag,
    Exhibition,
    OriginatingData,
    Hallway,
}

impl EntityKind {
    pub fn location(&self) -> &'static str {
        match self {
            EntityKind::Group => "ContentGroup",
            EntityKind::Element => "ContentElement",
            EntityKind::RequiredItem => "RequiredContentItem",
            EntityKind::Uploader => "Uploader",
            EntityKind::GroupPerson => "ContentGroupPerson",
            EntityKind::GroupExhibition => "ContentGroupExhibition",
            EntityKind::GroupTag => "ContentGroupTag",
            EntityKind::Person => "ContentPerson",
            EntityKind::Tag => "Tag",
            EntityKind::Exhibition => "Exhibition",
            EntityKind::OriginatingData => "OriginatingData",
            EntityKind::Hallway => "Hallway",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.location())
    }
}

/// Lifecycle accessors shared by every descriptor.
///
/// A descriptor is either *new* (client-only; `is_new() == true`, carries a
/// generated id) or *existing* (its id is the durable server key).
pub trait Entity {
    const KIND: EntityKind;

    fn id(&self) -> Option<&str>;

    fn is_new(&self) -> bool;

    /// Give an id-less descriptor a fresh client id and mark it new.
    ///
    /// Descriptors that already carry an id are left untouched: persisted ids
    /// are immutable.
    fn ensure_identity(&mut self) -> bool;

    /// Mark whether the descriptor is already persisted.
    fn set_new(&mut self, is_new: bool);

    /// Take `key` as the id of a descriptor that has none.
    fn fill_id(&mut self, key: &str);
}

/// Generate a client-side id for a new descriptor
pub fn new_client_id() -> String {
    Uuid::now_v7().to_string()
}

macro_rules! impl_entity {
    ($ty:ty, $kind:expr) => {
        impl $crate::model::entity::Entity for $ty {
            const KIND: $crate::model::entity::EntityKind = $kind;

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn is_new(&self) -> bool {
                self.is_new
            }

            fn ensure_identity(&mut self) -> bool {
                if self.id.is_some() {
                    return false;
                }
                self.id = Some($crate::model::entity::new_client_id());
                self.is_new = true;
                true
            }

            fn set_new(&mut self, is_new: bool) {
                self.is_new = is_new;
            }

            fn fill_id(&mut self, key: &str) {
                if self.id.is_none() {
                    self.id = Some(key.to_string());
                }
            }
        }
    };
}

pub(crate) use impl_entity;
