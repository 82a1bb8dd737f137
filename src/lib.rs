//! cablelist: link database of a cable list
//!
//! Tracks the links between unit connections of an electrical design, their
//! change history across design versions and the vehicle types that use
//! them. Links can be derived from article link templates when the
//! connections a template calls for appear on a unit.

pub mod cli;
pub mod core;
