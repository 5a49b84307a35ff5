// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Kiln.
//!
//! This module contains pure logic: no filesystem, no templating engine, no
//! logging. Everything with side effects is reached through the ports in
//! `crate::application::ports`.
//!
//! - `entities`: the configuration record, file sets, unit identity
//! - `resolution`: dependency ordering with cycle detection
//! - `imports`: grouped-import block normalization
//! - `value_objects`: user choices (backend, database, UI)
pub mod entities;
pub mod error;
pub mod imports;
pub mod resolution;
pub mod value_objects;

pub use entities::{
    ConfigRecord, ConfigRecordBuilder, FileClass, FileEntry, FileSet, Payload, Phase, RecordView,
    RelativePath, Stage, UnitInfo, UnitMetadata,
};

pub use error::{DomainError, ErrorCategory};

pub use resolution::DependencyGraph;

pub use value_objects::{Backend, Database, UiFramework};
