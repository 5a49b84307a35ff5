//! Application layer errors.
//!
//! These errors represent failures while driving the pipeline (rendering,
//! writing, lifecycle sequencing). Resolution and content rule violations
//! are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{Phase, Stage};
use crate::error::{ErrorCategory, KilnError};

/// Errors that occur during pipeline orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// The payload for `path` is not valid template syntax.
    #[error("Template syntax error in {path}: {reason}")]
    TemplateSyntax { path: String, reason: String },

    /// The payload parsed but failed while rendering (e.g. undefined field).
    #[error("Template execution error in {path}: {reason}")]
    TemplateExecution { path: String, reason: String },

    /// Directory creation, write or read-back failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Import normalization failed; the file stays on disk unsorted.
    #[error("Post-processing failed for {path}: {reason}")]
    PostProcess { path: PathBuf, reason: String },

    /// A lifecycle call arrived in the wrong phase.
    #[error("Cannot {operation} while the orchestrator is {actual}")]
    LifecycleViolation {
        operation: &'static str,
        actual: Phase,
    },

    /// A unit failed during one of its lifecycle stages.
    #[error("Unit '{unit}' failed to {stage}: {source}")]
    UnitFailed {
        unit: String,
        stage: Stage,
        #[source]
        source: Box<KilnError>,
    },

    /// One or more units failed to shut down. Every unit was attempted.
    #[error("{} unit(s) failed to shut down: {}", .failures.len(), list_units(.failures))]
    ShutdownFailed { failures: Vec<(String, KilnError)> },

    /// A unit name was looked up but never registered.
    #[error("Unit not registered: {name}")]
    UnitNotFound { name: String },
}

fn list_units(failures: &[(String, KilnError)]) -> String {
    failures
        .iter()
        .map(|(unit, err)| format!("{unit} ({err})"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ApplicationError {
    /// Wrap an error with the identity of the unit and stage that raised it.
    pub fn unit_failed(unit: impl Into<String>, stage: Stage, source: KilnError) -> Self {
        Self::UnitFailed {
            unit: unit.into(),
            stage,
            source: Box::new(source),
        }
    }

    /// Name of the failing unit, if this error identifies one.
    pub fn unit(&self) -> Option<&str> {
        match self {
            Self::UnitFailed { unit, .. } => Some(unit),
            _ => None,
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::TemplateSyntax { path, .. } | Self::TemplateExecution { path, .. } => vec![
                format!("The built-in template for '{}' could not be rendered", path),
                "This is a bug in the generation unit, please report it".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Check available disk space".into(),
            ],
            Self::PostProcess { path, .. } => vec![
                format!("'{}' was written but its imports are unsorted", path.display()),
                "Run gofmt/goimports on the file".into(),
            ],
            Self::UnitFailed { source, .. } => source.suggestions(),
            Self::ShutdownFailed { .. } => vec![
                "Generated files are complete; only unit cleanup failed".into(),
            ],
            Self::LifecycleViolation { .. } => {
                vec!["Lifecycle calls must follow register → init → execute → shutdown".into()]
            }
            Self::UnitNotFound { name } => vec![
                format!("No unit named '{}' is registered", name),
                "Try: kiln list to see the built-in units".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateSyntax { .. } | Self::TemplateExecution { .. } => {
                ErrorCategory::Rendering
            }
            Self::FilesystemError { .. } => ErrorCategory::Filesystem,
            Self::PostProcess { .. } => ErrorCategory::PostProcess,
            Self::UnitFailed { source, .. } => source.category(),
            Self::ShutdownFailed { .. } | Self::LifecycleViolation { .. } => {
                ErrorCategory::Internal
            }
            Self::UnitNotFound { .. } => ErrorCategory::NotFound,
        }
    }
}
