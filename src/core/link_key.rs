//! Composite identity of a link
//!
//! A link row is identified by (connection start, connection end, version,
//! modification). While a key is being edited some parts may still be unset;
//! such a key is *incomplete* and can not be used for storage. Only a
//! [`LinkPk`] (all four parts set) reaches the store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::keys::{KeyError, LinkVersion, ModificationKind, UnitConnectionId};

/// Complete link key: every part is set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkPk {
    pub connection_start: UnitConnectionId,
    pub connection_end: UnitConnectionId,
    pub version: LinkVersion,
    pub modification: ModificationKind,
}

impl LinkPk {
    /// Build a complete key; fails if `modification` is `Undefined`
    pub fn new(
        connection_start: UnitConnectionId,
        connection_end: UnitConnectionId,
        version: LinkVersion,
        modification: ModificationKind,
    ) -> Result<Self, KeyError> {
        if modification.is_null() {
            return Err(KeyError::Incomplete("modification"));
        }
        Ok(Self {
            connection_start,
            connection_end,
            version,
            modification,
        })
    }

    /// Same physical pair as `other` (version and modification ignored)
    pub fn same_pair(&self, other: &LinkPk) -> bool {
        self.connection_start == other.connection_start
            && self.connection_end == other.connection_end
    }

    /// Same key with another version/modification
    pub fn with_history(&self, version: LinkVersion, modification: ModificationKind) -> Self {
        Self {
            version,
            modification,
            ..*self
        }
    }
}

impl fmt::Display for LinkPk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.connection_start, self.connection_end, self.version, self.modification
        )
    }
}

impl FromStr for LinkPk {
    type Err = KeyError;

    /// Parses `START:END:VERSION:MODIFICATION`, e.g. `12:13:1.2:NEW`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [start, end, version, modification] = parts.as_slice() else {
            return Err(KeyError::InvalidLinkKey(s.to_string()));
        };
        Self::new(
            start.parse()?,
            end.parse()?,
            version.parse()?,
            modification.parse()?,
        )
    }
}

/// Parts of a key that may still be unset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkKeyParts {
    pub connection_start: Option<UnitConnectionId>,
    pub connection_end: Option<UnitConnectionId>,
    pub version: Option<LinkVersion>,
    pub modification: ModificationKind,
}

/// Link key under construction or edition
///
/// Clearing one part only makes the key incomplete: the other parts are
/// kept, so setting the cleared part again gives back a complete key.
///
/// Two null keys are equal whatever parts they still carry.
#[derive(Debug, Clone, Copy, Eq)]
pub enum LinkKey {
    Complete(LinkPk),
    Incomplete(LinkKeyParts),
}

impl PartialEq for LinkKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LinkKey::Complete(a), LinkKey::Complete(b)) => a == b,
            (LinkKey::Incomplete(_), LinkKey::Incomplete(_)) => true,
            _ => false,
        }
    }
}

impl Default for LinkKey {
    fn default() -> Self {
        LinkKey::Incomplete(LinkKeyParts::default())
    }
}

impl From<LinkPk> for LinkKey {
    fn from(pk: LinkPk) -> Self {
        LinkKey::Complete(pk)
    }
}

impl From<LinkKeyParts> for LinkKey {
    fn from(parts: LinkKeyParts) -> Self {
        match parts {
            LinkKeyParts {
                connection_start: Some(connection_start),
                connection_end: Some(connection_end),
                version: Some(version),
                modification,
            } if !modification.is_null() => LinkKey::Complete(LinkPk {
                connection_start,
                connection_end,
                version,
                modification,
            }),
            parts => LinkKey::Incomplete(parts),
        }
    }
}

impl LinkKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, LinkKey::Incomplete(_))
    }

    /// The complete key, if every part is set
    pub fn pk(&self) -> Option<&LinkPk> {
        match self {
            LinkKey::Complete(pk) => Some(pk),
            LinkKey::Incomplete(_) => None,
        }
    }

    /// Like [`LinkKey::pk`], but reports the first missing part
    pub fn require_pk(&self) -> Result<LinkPk, KeyError> {
        match self {
            LinkKey::Complete(pk) => Ok(*pk),
            LinkKey::Incomplete(parts) => Err(KeyError::Incomplete(
                if parts.connection_start.is_none() {
                    "connection start"
                } else if parts.connection_end.is_none() {
                    "connection end"
                } else if parts.version.is_none() {
                    "version"
                } else {
                    "modification"
                },
            )),
        }
    }

    pub fn parts(&self) -> LinkKeyParts {
        match self {
            LinkKey::Complete(pk) => LinkKeyParts {
                connection_start: Some(pk.connection_start),
                connection_end: Some(pk.connection_end),
                version: Some(pk.version),
                modification: pk.modification,
            },
            LinkKey::Incomplete(parts) => *parts,
        }
    }

    pub fn connection_start(&self) -> Option<UnitConnectionId> {
        self.parts().connection_start
    }

    pub fn connection_end(&self) -> Option<UnitConnectionId> {
        self.parts().connection_end
    }

    pub fn version(&self) -> Option<LinkVersion> {
        self.parts().version
    }

    pub fn modification(&self) -> ModificationKind {
        self.parts().modification
    }

    fn edit(&mut self, f: impl FnOnce(&mut LinkKeyParts)) {
        let mut parts = self.parts();
        f(&mut parts);
        *self = parts.into();
    }

    pub fn set_connection_start(&mut self, id: UnitConnectionId) {
        self.edit(|p| p.connection_start = Some(id));
    }

    pub fn set_connection_end(&mut self, id: UnitConnectionId) {
        self.edit(|p| p.connection_end = Some(id));
    }

    pub fn set_version(&mut self, version: LinkVersion) {
        self.edit(|p| p.version = Some(version));
    }

    pub fn set_modification(&mut self, modification: ModificationKind) {
        self.edit(|p| p.modification = modification);
    }

    pub fn clear_connection_start(&mut self) {
        self.edit(|p| p.connection_start = None);
    }

    pub fn clear_connection_end(&mut self) {
        self.edit(|p| p.connection_end = None);
    }

    /// Reset every part
    pub fn clear(&mut self) {
        *self = LinkKey::default();
    }
}
