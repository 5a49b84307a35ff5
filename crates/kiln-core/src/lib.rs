//! Kiln Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers of the Kiln
//! generation pipeline, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             kiln-cli (CLI)              │
//! │    builds ConfigRecord, selects units   │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (PluginManager, FileMaterializer,      │
//! │   SourceNormalizer, TemplateUnit)       │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │    (Filesystem, TemplateRenderer)       │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     kiln-adapters (Infrastructure)      │
//! │ (LocalFilesystem, MiniJinjaRenderer,    │
//! │  built-in units)                        │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ (ConfigRecord, FileSet, DependencyGraph,│
//! │  import sorting)                        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kiln_core::prelude::*;
//!
//! let record = Arc::new(ConfigRecord::builder().app_name("shop").build()?);
//! let materializer = FileMaterializer::new("./out", &record, filesystem);
//! let mut manager = PluginManager::new(Arc::clone(&record), renderer, materializer);
//! manager.register_all(units)?;
//! let report = manager.run()?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ExecutionContext, FileMaterializer, GenerationReport, GenerationUnit, PlannedUnit,
        PluginManager, TemplateUnit, WrittenFile,
        ports::{Filesystem, TemplateRenderer},
    };
    pub use crate::domain::{
        Backend, ConfigRecord, Database, FileClass, FileSet, Phase, RelativePath, Stage,
        UiFramework, UnitInfo, UnitMetadata,
    };
    pub use crate::error::{KilnError, KilnResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
