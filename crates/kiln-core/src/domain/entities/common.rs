use crate::domain::error::DomainError;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A filesystem path guaranteed to stay inside the project root.
///
/// Invariant: never absolute, never contains `..`. Enforced at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    /// Fallible constructor.
    ///
    /// `.` components are dropped so `./src/main.go` and `src/main.go` are the
    /// same key in a file set.
    pub fn try_new(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        if path.is_absolute() || path.has_root() {
            return Err(DomainError::AbsolutePathNotAllowed {
                path: path.display().to_string(),
            });
        }

        let mut clean = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(DomainError::PathEscapesRoot {
                        path: path.display().to_string(),
                    });
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(DomainError::AbsolutePathNotAllowed {
                        path: path.display().to_string(),
                    });
                }
            }
        }

        if clean.as_os_str().is_empty() {
            return Err(DomainError::EmptyPath {
                path: path.display().to_string(),
            });
        }

        Ok(Self(clean))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.to_str().unwrap_or("")
    }

    /// Lower-cased extension, if any.
    pub fn extension(&self) -> Option<String> {
        self.0
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }

    /// How the pipeline treats this file.
    pub fn class(&self) -> FileClass {
        FileClass::of(self)
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl TryFrom<&str> for RelativePath {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::try_new(s)
    }
}

/// Suffix-based classification of an output file.
///
/// - `Markup` files are rendered with HTML auto-escaping.
/// - `Source` files are rendered verbatim and get their import block sorted
///   after they are written.
/// - `Text` is everything else (configs, scripts, docs): rendered verbatim,
///   never post-processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Markup,
    Source,
    Text,
}

impl FileClass {
    pub const MARKUP_EXTENSIONS: &'static [&'static str] =
        &["html", "htm", "xhtml", "xml", "svg", "tmpl"];

    pub const SOURCE_EXTENSIONS: &'static [&'static str] = &["go"];

    pub fn of(path: &RelativePath) -> Self {
        match path.extension() {
            Some(ext) if Self::MARKUP_EXTENSIONS.contains(&ext.as_str()) => Self::Markup,
            Some(ext) if Self::SOURCE_EXTENSIONS.contains(&ext.as_str()) => Self::Source,
            _ => Self::Text,
        }
    }

    pub const fn escapes_markup(self) -> bool {
        matches!(self, Self::Markup)
    }

    pub const fn is_source(self) -> bool {
        matches!(self, Self::Source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(s: &str) -> RelativePath {
        RelativePath::try_new(s).unwrap()
    }

    #[test]
    fn current_dir_components_are_dropped() {
        assert_eq!(rel("./src/./main.go"), rel("src/main.go"));
    }

    #[test]
    fn absolute_paths_are_rejected() {
        assert!(matches!(
            RelativePath::try_new("/etc/passwd"),
            Err(DomainError::AbsolutePathNotAllowed { .. })
        ));
    }

    #[test]
    fn parent_components_are_rejected() {
        assert!(matches!(
            RelativePath::try_new("internal/../../escape.go"),
            Err(DomainError::PathEscapesRoot { .. })
        ));
    }

    #[test]
    fn empty_path_is_rejected() {
        for path in ["", ".", "./."] {
            assert!(
                matches!(RelativePath::try_new(path), Err(DomainError::EmptyPath { .. })),
                "accepted: {path:?}"
            );
        }
    }

    #[test]
    fn classification_by_suffix() {
        assert_eq!(rel("web/index.html").class(), FileClass::Markup);
        assert_eq!(rel("web/INDEX.HTM").class(), FileClass::Markup);
        assert_eq!(rel("cmd/api/main.go").class(), FileClass::Source);
        assert_eq!(rel("Makefile").class(), FileClass::Text);
        assert_eq!(rel(".env.example").class(), FileClass::Text);
        assert_eq!(rel("web/app.js").class(), FileClass::Text);
    }

    #[test]
    fn class_predicates() {
        assert!(rel("web/layout.tmpl").class().escapes_markup());
        assert!(!rel("README.md").class().escapes_markup());
        assert!(rel("internal/config/config.go").class().is_source());
        assert!(!rel("web/index.html").class().is_source());
    }
}
