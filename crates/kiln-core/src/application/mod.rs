//! Application layer for Kiln.
//!
//! This layer contains:
//! - **Services**: pipeline orchestration (PluginManager, FileMaterializer)
//! - **Units**: the GenerationUnit contract and the generic TemplateUnit
//! - **Ports**: interface definitions (traits) for external dependencies
//! - **Errors**: application-specific error types
//!
//! Ordering rules, path rules and import sorting live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;
pub mod unit;

pub use services::{
    FileMaterializer, GenerationReport, PlannedUnit, PluginManager, SourceNormalizer, WrittenFile,
};

pub use unit::{Blueprint, ExecutionContext, GenerationUnit, TemplateUnit, TemplateUnitBuilder};

pub use ports::{Filesystem, TemplateRenderer};

pub use error::ApplicationError;
