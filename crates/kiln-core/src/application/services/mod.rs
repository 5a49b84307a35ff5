//! Application services - orchestrate the generation pipeline.
//!
//! - `plugin_manager`: unit registry and lifecycle sequencing
//! - `materializer`: rooted, overwriting file writes
//! - `normalizer`: import sorting for written source files

pub mod materializer;
pub mod normalizer;
pub mod plugin_manager;

pub use materializer::{FileMaterializer, WrittenFile};
pub use normalizer::SourceNormalizer;
pub use plugin_manager::{GenerationReport, PlannedUnit, PluginManager};
