//! Error type shared by the link stores

use miette::Diagnostic;
use thiserror::Error;

use crate::core::keys::KeyError;
use crate::core::store::vehicle_type_link::VehicleTypeListError;

/// Errors returned by the cable list stores
#[derive(Debug, Error, Diagnostic)]
pub enum CableListError {
    /// The storage engine rejected a statement or a transaction call
    #[error("storage error: {0}")]
    #[diagnostic(code(cablelist::storage))]
    Storage(#[from] rusqlite::Error),

    /// A template could not be resolved against a unit
    #[error("article link {template} can not be resolved on unit {unit}: {reason}")]
    #[diagnostic(
        code(cablelist::template_resolution),
        help("both connections must belong to the same unit and refer to the template's article connections")
    )]
    TemplateResolution {
        template: String,
        unit: String,
        reason: String,
    },

    #[error(transparent)]
    #[diagnostic(code(cablelist::invalid_key))]
    InvalidKey(#[from] KeyError),

    #[error(transparent)]
    #[diagnostic(code(cablelist::vehicle_types))]
    VehicleTypeList(#[from] VehicleTypeListError),

    #[error("database schema version {found} does not match expected version {expected}")]
    #[diagnostic(
        code(cablelist::schema_mismatch),
        help("the database was created by another cablelist release")
    )]
    SchemaMismatch { found: i32, expected: i32 },

    #[error("I/O error: {0}")]
    #[diagnostic(code(cablelist::io))]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = CableListError> = std::result::Result<T, E>;
