// ============================================================================
// domain/error.rs - REGISTRATION, RESOLUTION AND CONTENT ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they are carried inside aggregated shutdown reports)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Registration / Resolution Errors
    // ========================================================================
    #[error("Unit name '{name}' is empty or already registered")]
    DuplicateOrEmptyName { name: String },

    #[error("Unit '{unit}' depends on unknown unit '{dependency}'")]
    UnknownDependency { unit: String, dependency: String },

    #[error("Cyclic dependency: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    // ========================================================================
    // File Set Errors
    // ========================================================================
    #[error("Duplicate path in file set: {path}")]
    DuplicatePath { path: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Path escapes the project root: {path}")]
    PathEscapesRoot { path: String },

    #[error("Output path is empty: '{path}'")]
    EmptyPath { path: String },

    // ========================================================================
    // Source Normalization
    // ========================================================================
    #[error("Grouped import block opened on line {line} is never closed")]
    MalformedImportBlock { line: usize },

    // ========================================================================
    // Configuration Record
    // ========================================================================
    #[error("Invalid configuration record: {0}")]
    InvalidConfig(String),

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::DuplicateOrEmptyName { name } if name.is_empty() => vec![
                "Every generation unit needs a non-empty name".into(),
                "This is a bug in the unit definition, please report it".into(),
            ],
            Self::DuplicateOrEmptyName { name } => vec![
                format!("Unit '{}' was registered twice", name),
                "Register each unit exactly once per run".into(),
            ],
            Self::UnknownDependency { unit, dependency } => vec![
                format!("'{}' requires '{}' to be part of the run", unit, dependency),
                format!("Register '{}' before generating", dependency),
                "Try: kiln list to see the built-in units".into(),
            ],
            Self::CyclicDependency { cycle } => vec![
                format!("Units form a cycle: {}", cycle.join(" -> ")),
                "Remove one of the dependencies to break the cycle".into(),
            ],
            Self::MalformedImportBlock { line } => vec![
                format!("The import block starting on line {} has no closing ')'", line),
                "The file was written but left unsorted".into(),
            ],
            Self::InvalidConfig(msg) => vec![
                "Check the values passed to `kiln new`".into(),
                format!("Details: {}", msg),
            ],
            Self::EmptyPath { .. } => vec![
                "Every output file needs a name below the project root".into(),
                "This is a bug in the unit definition, please report it".into(),
            ],
            Self::MissingRequiredField { field } => vec![
                format!("Provide a value for '{}'", field),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfig(_) | Self::MissingRequiredField { .. } => {
                ErrorCategory::Validation
            }
            Self::DuplicateOrEmptyName { .. }
            | Self::UnknownDependency { .. }
            | Self::CyclicDependency { .. } => ErrorCategory::Resolution,
            Self::MalformedImportBlock { .. } => ErrorCategory::PostProcess,
            _ => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Resolution,
    PostProcess,
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_the_path() {
        let err = DomainError::CyclicDependency {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Cyclic dependency: a -> b -> a");
    }

    #[test]
    fn empty_name_gets_its_own_suggestion() {
        let empty = DomainError::DuplicateOrEmptyName { name: String::new() };
        let dup = DomainError::DuplicateOrEmptyName { name: "router".into() };
        assert!(empty.suggestions()[0].contains("non-empty"));
        assert!(dup.suggestions()[0].contains("router"));
    }

    #[test]
    fn resolution_errors_share_a_category() {
        let unknown = DomainError::UnknownDependency {
            unit: "a".into(),
            dependency: "b".into(),
        };
        assert_eq!(unknown.category(), ErrorCategory::Resolution);
        assert_eq!(
            DomainError::InvalidConfig("x".into()).category(),
            ErrorCategory::Validation
        );
    }

    #[test]
    fn empty_path_is_a_unit_bug() {
        let err = DomainError::EmptyPath { path: ".".into() };
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert!(err.suggestions().iter().any(|s| s.contains("unit definition")));
    }
}
