//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the pipeline needs from external systems.
//! The `kiln-adapters` crate provides implementations.

use std::path::Path;

use crate::domain::{ConfigRecord, RelativePath};
use crate::error::KilnResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `kiln_adapters::filesystem::LocalFilesystem` (production)
/// - `kiln_adapters::filesystem::MemoryFilesystem` (testing, dry runs)
///
/// Paths handed to a `Filesystem` are already rooted by the materializer.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> KilnResult<()>;

    /// Write content to a file, replacing it if it exists.
    fn write_file(&self, path: &Path, content: &str) -> KilnResult<()>;

    /// Read a whole file as UTF-8.
    fn read_file(&self, path: &Path) -> KilnResult<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `kiln_adapters::renderer::MiniJinjaRenderer`
///
/// The escaping mode is chosen from `path`'s suffix; see
/// [`FileClass`](crate::domain::FileClass).
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    /// Render `raw` against `record`.
    ///
    /// # Errors
    /// - `TemplateSyntax` if `raw` does not parse
    /// - `TemplateExecution` if rendering fails (e.g. an undefined field)
    fn render(&self, path: &RelativePath, raw: &str, record: &ConfigRecord)
    -> KilnResult<String>;
}
