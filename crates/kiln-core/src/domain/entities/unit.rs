use serde::Serialize;
use std::fmt;

/// Display-only authorship information for a generation unit.
///
/// Nothing in the pipeline branches on these values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnitMetadata {
    pub description: String,
    pub author: String,
    pub contact: Option<String>,
}

impl UnitMetadata {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }
}

/// Snapshot of a unit's identity, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitInfo {
    pub name: String,
    pub version: String,
    pub dependencies: Vec<String>,
    #[serde(flatten)]
    pub metadata: UnitMetadata,
}

impl fmt::Display for UnitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Per-unit lifecycle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Initialize,
    Execute,
    Shutdown,
}

impl Stage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Execute => "execute",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orchestrator state for one run.
///
/// ```text
/// Empty → Registered → Ordered → Initialized → Executed → ShutDown
///                                     │             │
///                                     └── Failed ───┘ (init/execute error)
/// ```
///
/// `Failed` records that a fatal error stopped the forward passes; from
/// there only `shutdown_all` is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Registered,
    Ordered,
    Initialized,
    Executed,
    Failed(Stage),
    ShutDown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty"),
            Self::Registered => f.write_str("registered"),
            Self::Ordered => f.write_str("ordered"),
            Self::Initialized => f.write_str("initialized"),
            Self::Executed => f.write_str("executed"),
            Self::Failed(stage) => write!(f, "failed during {stage}"),
            Self::ShutDown => f.write_str("shut down"),
        }
    }
}
