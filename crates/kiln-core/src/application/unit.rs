//! The generation unit contract and its generic implementation.
//!
//! A unit owns a named slice of the output project. Its lifecycle is driven
//! by the [`PluginManager`](crate::application::PluginManager):
//!
//! 1. `initialize` fills the unit's [`FileSet`]; nothing touches disk.
//! 2. `execute` renders and materializes every entry, in insertion order.
//! 3. `shutdown` drops unit-local state.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::{
    ports::TemplateRenderer,
    services::materializer::{FileMaterializer, WrittenFile},
};
use crate::domain::{ConfigRecord, DomainError, FileEntry, FileSet, UnitInfo, UnitMetadata};
use crate::error::{KilnError, KilnResult};

/// A self-contained component producing part of the generated project.
pub trait GenerationUnit: Send {
    /// Unique, non-empty identifier within one run.
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Names of units that must be initialized and executed first.
    fn dependencies(&self) -> &[String];

    fn metadata(&self) -> &UnitMetadata;

    /// Files the unit will produce. Empty until `initialize` has run.
    fn files(&self) -> &FileSet;

    /// Populate the file set. Must not write anything.
    fn initialize(&mut self) -> KilnResult<()>;

    /// Render and write every file in the set.
    fn execute(&mut self, ctx: &mut ExecutionContext<'_>) -> KilnResult<()>;

    /// Release unit-local resources. Called once per run, in reverse order.
    fn shutdown(&mut self) -> KilnResult<()>;

    fn info(&self) -> UnitInfo {
        UnitInfo {
            name: self.name().to_string(),
            version: self.version().to_string(),
            dependencies: self.dependencies().to_vec(),
            metadata: self.metadata().clone(),
        }
    }
}

/// Everything a unit needs during `execute`.
///
/// One context lives for the whole execute pass, so it also collects what
/// was written and any non-fatal warnings across units.
pub struct ExecutionContext<'a> {
    record: &'a ConfigRecord,
    renderer: &'a dyn TemplateRenderer,
    materializer: &'a FileMaterializer,
    written: Vec<WrittenFile>,
    warnings: Vec<KilnError>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        record: &'a ConfigRecord,
        renderer: &'a dyn TemplateRenderer,
        materializer: &'a FileMaterializer,
    ) -> Self {
        Self {
            record,
            renderer,
            materializer,
            written: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Render one entry and write it under the project root.
    ///
    /// Import normalization failures are recorded as warnings; the file
    /// stays on disk as rendered and generation continues.
    ///
    /// # Errors
    /// Render and write failures, naming the offending path.
    pub fn materialize(&mut self, entry: &FileEntry) -> KilnResult<()> {
        let content = self.renderer.render(&entry.path, entry.raw(), self.record)?;

        match self.materializer.write(&entry.path, &content) {
            Ok(written) => self.written.push(written),
            Err(e) if e.is_post_process() => {
                warn!(path = %entry.path, "Keeping file with unsorted imports");
                self.written.push(WrittenFile {
                    path: entry.path.clone(),
                    bytes: content.len(),
                    normalized: false,
                });
                self.warnings.push(e);
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    pub fn written(&self) -> &[WrittenFile] {
        &self.written
    }

    pub fn warnings(&self) -> &[KilnError] {
        &self.warnings
    }

    pub fn into_parts(self) -> (Vec<WrittenFile>, Vec<KilnError>) {
        (self.written, self.warnings)
    }
}

/// Fills a file set from the configuration record.
pub type Blueprint = fn(&ConfigRecord, &mut FileSet) -> Result<(), DomainError>;

/// Generic unit whose files come from a [`Blueprint`].
///
/// Concrete units differ only in identity and blueprint.
pub struct TemplateUnit {
    name: String,
    version: String,
    dependencies: Vec<String>,
    metadata: UnitMetadata,
    blueprint: Blueprint,
    record: Arc<ConfigRecord>,
    files: FileSet,
}

impl TemplateUnit {
    pub fn builder(name: impl Into<String>, blueprint: Blueprint) -> TemplateUnitBuilder {
        TemplateUnitBuilder {
            name: name.into(),
            version: "1.0.0".into(),
            dependencies: Vec::new(),
            metadata: UnitMetadata::default(),
            blueprint,
        }
    }
}

impl GenerationUnit for TemplateUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    fn metadata(&self) -> &UnitMetadata {
        &self.metadata
    }

    fn files(&self) -> &FileSet {
        &self.files
    }

    fn initialize(&mut self) -> KilnResult<()> {
        self.files.clear();
        (self.blueprint)(&self.record, &mut self.files)?;
        debug!(unit = %self.name, files = self.files.len(), "Unit initialized");
        Ok(())
    }

    fn execute(&mut self, ctx: &mut ExecutionContext<'_>) -> KilnResult<()> {
        for entry in &self.files {
            ctx.materialize(entry)?;
        }
        Ok(())
    }

    fn shutdown(&mut self) -> KilnResult<()> {
        self.files.clear();
        Ok(())
    }
}

pub struct TemplateUnitBuilder {
    name: String,
    version: String,
    dependencies: Vec<String>,
    metadata: UnitMetadata,
    blueprint: Blueprint,
}

impl TemplateUnitBuilder {
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    pub fn metadata(mut self, metadata: UnitMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn build(self, record: Arc<ConfigRecord>) -> TemplateUnit {
        TemplateUnit {
            name: self.name,
            version: self.version,
            dependencies: self.dependencies,
            metadata: self.metadata,
            blueprint: self.blueprint,
            record,
            files: FileSet::new(),
        }
    }
}
