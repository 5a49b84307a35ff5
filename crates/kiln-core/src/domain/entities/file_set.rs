use std::collections::HashSet;

use crate::domain::{entities::common::RelativePath, error::DomainError};

/// Zero-argument function producing a raw template payload.
///
/// Payload text is opaque to the pipeline: it is handed to the renderer
/// and never inspected otherwise.
pub type Payload = fn() -> &'static str;

/// One output file a unit intends to produce.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: RelativePath,
    pub payload: Payload,
}

impl FileEntry {
    /// Raw template text for this entry.
    pub fn raw(&self) -> &'static str {
        (self.payload)()
    }
}

/// Ordered mapping from output path to payload.
///
/// Iteration follows insertion order, so generation order (and therefore
/// logs and partial-failure effects) is reproducible.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    entries: Vec<FileEntry>,
    seen: HashSet<RelativePath>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file. Rejects absolute, escaping and duplicate paths.
    pub fn add(&mut self, path: impl AsRef<str>, payload: Payload) -> Result<(), DomainError> {
        let path = RelativePath::try_new(path.as_ref())?;
        if !self.seen.insert(path.clone()) {
            return Err(DomainError::DuplicatePath {
                path: path.to_string(),
            });
        }
        self.entries.push(FileEntry { path, payload });
        Ok(())
    }

    /// Add a file only when `condition` holds.
    pub fn add_if(
        &mut self,
        condition: bool,
        path: impl AsRef<str>,
        payload: Payload,
    ) -> Result<(), DomainError> {
        if condition {
            self.add(path, payload)?;
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &RelativePath> {
        self.entries.iter().map(|e| &e.path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.seen.clear();
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a FileEntry;
    type IntoIter = std::slice::Iter<'a, FileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_follows_insertion_order() {
        let mut files = FileSet::new();
        files.add("z.go", || "z").unwrap();
        files.add("a.go", || "a").unwrap();
        files.add("m/n.go", || "n").unwrap();

        let order: Vec<_> = files.paths().map(|p| p.to_string()).collect();
        assert_eq!(order, vec!["z.go", "a.go", "m/n.go"]);
    }

    #[test]
    fn duplicate_paths_are_rejected() {
        let mut files = FileSet::new();
        files.add("main.go", || "").unwrap();
        let err = files.add("./main.go", || "").unwrap_err();
        assert_eq!(
            err,
            DomainError::DuplicatePath {
                path: "main.go".into()
            }
        );
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn add_if_skips_false_conditions() {
        let mut files = FileSet::new();
        files.add_if(false, "skipped.go", || "").unwrap();
        files.add_if(true, "kept.go", || "").unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn payload_is_produced_on_demand() {
        let mut files = FileSet::new();
        files.add("README.md", || "# {{ app_name }}").unwrap();
        assert_eq!(files.iter().next().unwrap().raw(), "# {{ app_name }}");
    }
}
