//! Key value types for the link tables
//!
//! Every foreign key a link row carries gets its own small type here:
//! connection ids, versions and the three code-table enums. The code enums
//! have an `Undefined` variant that stands for "no code", so decoding a value
//! read from the database can never fail.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn id(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = KeyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| KeyError::InvalidId(s.to_string()))
            }
        }

        impl rusqlite::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(self.0.into())
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
                i64::column_result(value).map(Self)
            }
        }
    };
}

id_type!(
    /// Endpoint of a link: a row of the unit connection catalog
    UnitConnectionId
);
id_type!(
    /// Catalog-level connection, referenced by article link templates
    ArticleConnectionId
);
id_type!(
    /// Physical unit that owns unit connections
    UnitId
);
id_type!(
    /// Vehicle type (configuration / variant)
    VehicleTypeId
);
id_type!(
    /// Wire used by a cable link
    WireId
);

/// Design revision, stored as `decimal version * 1000`
///
/// Version "1.2" is stored as 1200. Only positive values are valid; an absent
/// version is expressed with `Option<LinkVersion>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct LinkVersion(i64);

impl LinkVersion {
    /// Build from the stored integer form (1200 for "1.2")
    pub fn from_integer(value: i64) -> Result<Self, KeyError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(KeyError::InvalidVersion(value.to_string()))
        }
    }

    /// Build from the decimal form shown to users (1.2 for 1200)
    pub fn from_decimal(value: f64) -> Result<Self, KeyError> {
        if !value.is_finite() {
            return Err(KeyError::InvalidVersion(value.to_string()));
        }
        let scaled = (value * 1000.0).round();
        if scaled < 1.0 || scaled > i64::MAX as f64 {
            return Err(KeyError::InvalidVersion(value.to_string()));
        }
        Ok(Self(scaled as i64))
    }

    pub fn as_integer(&self) -> i64 {
        self.0
    }

    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl fmt::Display for LinkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_decimal())
    }
}

impl FromStr for LinkVersion {
    type Err = KeyError;

    /// Parses the decimal form ("1.2")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| KeyError::InvalidVersion(s.to_string()))?;
        Self::from_decimal(value)
    }
}

impl TryFrom<i64> for LinkVersion {
    type Error = KeyError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_integer(value)
    }
}

impl From<LinkVersion> for i64 {
    fn from(version: LinkVersion) -> Self {
        version.0
    }
}

impl rusqlite::ToSql for LinkVersion {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        Ok(self.0.into())
    }
}

impl rusqlite::types::FromSql for LinkVersion {
    fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
        let raw = i64::column_result(value)?;
        Self::from_integer(raw).map_err(|_| rusqlite::types::FromSqlError::OutOfRange(raw))
    }
}

/// Implements the code-table plumbing shared by the three code enums:
/// lenient `from_code`, strict `FromStr`, serde as code, and SQL mapping.
macro_rules! code_enum {
    ($name:ident, $what:literal, { $($variant:ident => $code:literal),+ $(,)? }) => {
        impl $name {
            /// Stable code stored in the code table (empty for `Undefined`)
            pub fn code(&self) -> &'static str {
                match self {
                    $name::Undefined => "",
                    $($name::$variant => $code,)+
                }
            }

            /// Decode a stored code; unknown or empty codes give `Undefined`
            pub fn from_code(code: &str) -> Self {
                match code {
                    $($code => $name::$variant,)+
                    _ => $name::Undefined,
                }
            }

            /// All defined values (without `Undefined`)
            pub fn all() -> &'static [$name] {
                &[$($name::$variant,)+]
            }

            pub fn is_null(&self) -> bool {
                matches!(self, $name::Undefined)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.code())
            }
        }

        impl FromStr for $name {
            type Err = KeyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match Self::from_code(&s.trim().to_uppercase()) {
                    $name::Undefined => Err(KeyError::InvalidCode {
                        kind: $what,
                        code: s.to_string(),
                    }),
                    value => Ok(value),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.code())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Ok(Self::from_code(&s))
            }
        }

        impl rusqlite::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                match self {
                    $name::Undefined => Ok(rusqlite::types::Null.into()),
                    value => Ok(value.code().into()),
                }
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
                match value {
                    rusqlite::types::ValueRef::Null => Ok($name::Undefined),
                    other => String::column_result(other).map(|s| Self::from_code(&s)),
                }
            }
        }
    };
}

/// Nature of the change a history entry encodes at a given version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModificationKind {
    #[default]
    Undefined,
    /// Introduced in this version
    New,
    /// Carried over unchanged
    Exists,
    /// Removed in this version
    Rem,
    /// Added half of an in-place modification
    ModNew,
    /// Removed half of an in-place modification
    ModRem,
}

code_enum!(ModificationKind, "modification", {
    New => "NEW",
    Exists => "EXISTS",
    Rem => "REM",
    ModNew => "MODNEW",
    ModRem => "MODREM",
});

impl ModificationKind {
    /// Sort order used by the modification code table
    pub fn sort_order(&self) -> i32 {
        match self {
            ModificationKind::ModRem => 1,
            ModificationKind::ModNew => 2,
            ModificationKind::Undefined => 0,
            _ => 3,
        }
    }

    /// Whether the link is gone after this history entry
    pub fn is_removal(&self) -> bool {
        matches!(self, ModificationKind::Rem | ModificationKind::ModRem)
    }

    /// English label stored in the code table
    pub fn name(&self) -> &'static str {
        match self {
            ModificationKind::Undefined => "",
            ModificationKind::New => "New",
            ModificationKind::Exists => "Existing",
            ModificationKind::Rem => "Remove",
            ModificationKind::ModNew => "Modify (+)",
            ModificationKind::ModRem => "Modify (-)",
        }
    }
}

/// Kind of physical link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LinkType {
    #[default]
    Undefined,
    CableLink,
    InternalLink,
    Connection,
    TestLink,
}

code_enum!(LinkType, "link type", {
    CableLink => "CABLELINK",
    InternalLink => "INTERNLINK",
    Connection => "CONNECTION",
    TestLink => "TESTLINK",
});

impl LinkType {
    pub fn name(&self) -> &'static str {
        match self {
            LinkType::Undefined => "",
            LinkType::CableLink => "Cable link",
            LinkType::InternalLink => "Internal link",
            LinkType::Connection => "Connection",
            LinkType::TestLink => "Test link",
        }
    }

    /// Unit of the value (resistance) carried by links of this type
    pub fn value_unit(&self) -> &'static str {
        match self {
            LinkType::Undefined => "",
            _ => "Ohm",
        }
    }

    /// Directions a link of this type may have
    ///
    /// Every defined link type is bidirectional; `Undefined` puts no restriction.
    pub fn allowed_directions(&self) -> &'static [LinkDirection] {
        match self {
            LinkType::Undefined => LinkDirection::all(),
            _ => &[LinkDirection::Bidirectional],
        }
    }
}

/// Direction of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LinkDirection {
    #[default]
    Undefined,
    Bidirectional,
    StartToEnd,
    EndToStart,
}

code_enum!(LinkDirection, "link direction", {
    Bidirectional => "BID",
    StartToEnd => "STE",
    EndToStart => "ETS",
});

impl LinkDirection {
    pub fn name(&self) -> &'static str {
        match self {
            LinkDirection::Undefined => "",
            LinkDirection::Bidirectional => "Bidirectional",
            LinkDirection::StartToEnd => "Start to end",
            LinkDirection::EndToStart => "End to start",
        }
    }

    /// ASCII picture used in link lists
    pub fn picture(&self) -> &'static str {
        match self {
            LinkDirection::Undefined => "",
            LinkDirection::Bidirectional => "<-->",
            LinkDirection::StartToEnd => "-->",
            LinkDirection::EndToStart => "<--",
        }
    }

    pub fn is_allowed_for(&self, link_type: LinkType) -> bool {
        link_type.allowed_directions().contains(self)
    }
}

/// Errors that can occur when building or parsing key values
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KeyError {
    #[error("invalid id: '{0}' (expected an integer)")]
    InvalidId(String),

    #[error("invalid version: '{0}' (expected a positive number with at most 3 decimals)")]
    InvalidVersion(String),

    #[error("invalid {kind} code: '{code}'")]
    InvalidCode { kind: &'static str, code: String },

    #[error("invalid link key: '{0}' (expected START:END:VERSION:MODIFICATION, e.g. 12:13:1.2:NEW)")]
    InvalidLinkKey(String),

    #[error("link key is incomplete: {0} is not set")]
    Incomplete(&'static str),
}
