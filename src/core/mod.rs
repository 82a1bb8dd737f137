//! Core module - link identity, storage and project handling

pub mod config;
pub mod error;
pub mod keys;
pub mod link;
pub mod link_key;
pub mod project;
pub mod store;

pub use config::Config;
pub use error::{CableListError, Result};
pub use keys::{
    ArticleConnectionId, KeyError, LinkDirection, LinkType, LinkVersion, ModificationKind,
    UnitConnectionId, UnitId, VehicleTypeId, WireId,
};
pub use link::{ArticleLinkRef, LinkAttributes, LinkData};
pub use link_key::{LinkKey, LinkKeyParts, LinkPk};
pub use project::{Project, ProjectError};
pub use store::{Database, DatabaseStats};
