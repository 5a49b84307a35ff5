//! Source normalizer: sorts the grouped-import block of a written file.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::ports::Filesystem;
use crate::domain::imports::sort_import_block;
use crate::error::KilnResult;

/// Rewrites a file on disk with its first `import ( ... )` block sorted.
#[derive(Clone)]
pub struct SourceNormalizer {
    filesystem: Arc<dyn Filesystem>,
}

impl SourceNormalizer {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Sort the import block of the file at `path` in place.
    ///
    /// Returns `true` if the file was rewritten. A file without a block, or
    /// whose block is already in canonical form, is left untouched.
    ///
    /// # Errors
    /// - `MalformedImportBlock` for an unclosed block (file untouched)
    /// - filesystem errors from the read or the write-back
    pub fn normalize_imports(&self, path: &Path) -> KilnResult<bool> {
        let source = self.filesystem.read_file(path)?;

        let Some(sorted) = sort_import_block(&source)? else {
            return Ok(false);
        };
        if sorted == source {
            return Ok(false);
        }

        self.filesystem.write_file(path, &sorted)?;
        debug!(path = %path.display(), "Sorted import block");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockFilesystem;
    use crate::domain::DomainError;
    use crate::error::KilnError;
    use mockall::predicate::*;

    const UNSORTED: &str = "package main\n\nimport (\n\t\"os\"\n\t\"fmt\"\n)\n";
    const SORTED: &str = "package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n";

    fn normalizer_reading(content: &'static str) -> MockFilesystem {
        let mut fs = MockFilesystem::new();
        fs.expect_read_file()
            .returning(move |_| Ok(content.to_string()));
        fs
    }

    #[test]
    fn unsorted_block_is_written_back() {
        let mut fs = normalizer_reading(UNSORTED);
        fs.expect_write_file()
            .with(eq(Path::new("app/main.go")), eq(SORTED))
            .times(1)
            .returning(|_, _| Ok(()));

        let normalizer = SourceNormalizer::new(Arc::new(fs));
        assert!(normalizer.normalize_imports(Path::new("app/main.go")).unwrap());
    }

    #[test]
    fn sorted_block_is_not_rewritten() {
        let mut fs = normalizer_reading(SORTED);
        fs.expect_write_file().never();

        let normalizer = SourceNormalizer::new(Arc::new(fs));
        assert!(!normalizer.normalize_imports(Path::new("main.go")).unwrap());
    }

    #[test]
    fn file_without_block_is_not_rewritten() {
        let mut fs = normalizer_reading("package main\n\nimport \"fmt\"\n");
        fs.expect_write_file().never();

        let normalizer = SourceNormalizer::new(Arc::new(fs));
        assert!(!normalizer.normalize_imports(Path::new("main.go")).unwrap());
    }

    #[test]
    fn unclosed_block_leaves_file_alone() {
        let mut fs = normalizer_reading("package main\nimport (\n\t\"os\"\n");
        fs.expect_write_file().never();

        let normalizer = SourceNormalizer::new(Arc::new(fs));
        let err = normalizer
            .normalize_imports(Path::new("main.go"))
            .unwrap_err();
        assert!(matches!(
            err,
            KilnError::Domain(DomainError::MalformedImportBlock { line: 2 })
        ));
    }
}
