//! Link data: key plus the attributes stored in the link row

use serde::{Deserialize, Serialize};

use crate::core::keys::{ArticleConnectionId, LinkDirection, LinkType, WireId};
use crate::core::link_key::LinkPk;

/// Reference to the article link template a link was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleLinkRef {
    pub connection_start: ArticleConnectionId,
    pub connection_end: ArticleConnectionId,
}

/// Attributes owned by a link row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkAttributes {
    pub link_type: LinkType,
    pub direction: LinkDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification: Option<String>,
    /// Resistance [Ohm]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_link: Option<ArticleLinkRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wire: Option<WireId>,
}

impl LinkAttributes {
    pub fn new(link_type: LinkType, direction: LinkDirection) -> Self {
        Self {
            link_type,
            direction,
            ..Default::default()
        }
    }

    /// Type and direction are mandatory in the link table
    pub fn is_null(&self) -> bool {
        self.link_type.is_null() || self.direction.is_null()
    }
}

/// A link: complete key and attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkData {
    pub key: LinkPk,
    #[serde(flatten)]
    pub attributes: LinkAttributes,
}

impl LinkData {
    pub fn new(key: LinkPk, attributes: LinkAttributes) -> Self {
        Self { key, attributes }
    }
}
