pub mod catalog;
pub mod entity;
pub mod group;
pub mod import;
pub mod snapshot;

pub use catalog::{Exhibition, Hallway, OriginatingData, Person, Tag};
pub use entity::{Entity, EntityKind};
pub use group::{Element, Group, GroupExhibition, GroupPerson, RequiredItem, Uploader};
pub use import::{ImportPayload, IntermediaryData};
pub use snapshot::{DirtyKeys, Snapshot};
