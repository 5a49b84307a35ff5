//! File materializer: writes rendered content under the project root.
//!
//! Generation is not incremental. Every write replaces whatever is already at
//! the target path, so re-running a generation with the same record over an
//! existing tree yields the same bytes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::application::{
    ApplicationError,
    ports::Filesystem,
    services::normalizer::SourceNormalizer,
};
use crate::domain::{ConfigRecord, RelativePath};
use crate::error::KilnResult;

/// Record of one file the materializer wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    #[serde(serialize_with = "serialize_display")]
    pub path: RelativePath,
    pub bytes: usize,
    /// Whether the import normalizer rewrote the file.
    pub normalized: bool,
}

fn serialize_display<S: serde::Serializer>(
    path: &RelativePath,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(path)
}

/// Writes files beneath `<base_dir>/<lower(app_name)>`.
#[derive(Clone)]
pub struct FileMaterializer {
    root: PathBuf,
    filesystem: Arc<dyn Filesystem>,
    normalizer: SourceNormalizer,
}

impl FileMaterializer {
    pub fn new(
        base_dir: impl AsRef<Path>,
        record: &ConfigRecord,
        filesystem: Arc<dyn Filesystem>,
    ) -> Self {
        Self {
            root: base_dir.as_ref().join(record.project_dir()),
            normalizer: SourceNormalizer::new(Arc::clone(&filesystem)),
            filesystem,
        }
    }

    /// The project root every output path is joined onto.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute (or base-relative) location of `path` on the filesystem.
    pub fn resolve(&self, path: &RelativePath) -> PathBuf {
        self.root.join(path.as_path())
    }

    /// Write `content` to `path`, creating missing parent directories.
    ///
    /// Source files are normalized after the write.
    ///
    /// # Errors
    /// - `FilesystemError` if a directory or the file cannot be written
    /// - `PostProcess` if normalization fails; the file is still on disk,
    ///   exactly as rendered
    pub fn write(&self, path: &RelativePath, content: &str) -> KilnResult<WrittenFile> {
        let target = self.resolve(path);

        if let Some(parent) = target.parent() {
            self.filesystem.create_dir_all(parent)?;
        }
        self.filesystem.write_file(&target, content)?;
        debug!(path = %path, bytes = content.len(), "Wrote file");

        let mut written = WrittenFile {
            path: path.clone(),
            bytes: content.len(),
            normalized: false,
        };

        if path.class().is_source() {
            match self.normalizer.normalize_imports(&target) {
                Ok(changed) => written.normalized = changed,
                Err(e) => {
                    warn!(path = %path, error = %e, "Import normalization failed");
                    return Err(ApplicationError::PostProcess {
                        path: target,
                        reason: e.to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(written)
    }
}
