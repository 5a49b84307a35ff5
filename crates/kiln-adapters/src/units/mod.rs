//! Built-in generation units for Go web services.
//!
//! Each submodule exposes one [`BuiltinUnit`] descriptor: identity,
//! dependencies, a selection predicate and the blueprint that fills the
//! unit's file set. Payloads are MiniJinja templates compiled into the
//! binary.
//!
//! | unit         | depends on | selected when              |
//! |--------------|------------|----------------------------|
//! | `project`    |            | always                     |
//! | `config`     | project    | always                     |
//! | `database`   | config     | a database driver is set   |
//! | `router`     | config     | always                     |
//! | `middleware` | router     | always                     |
//! | `events`     | project    | `--events`                 |
//! | `ui`         | router     | a UI framework is set      |
//! | `docker`     | project    | `--docker`                 |

use std::sync::Arc;

use tracing::debug;

use kiln_core::{
    application::{Blueprint, GenerationUnit, TemplateUnit},
    domain::{ConfigRecord, UnitInfo, UnitMetadata},
};

pub mod config;
pub mod database;
pub mod docker;
pub mod events;
pub mod middleware;
pub mod project;
pub mod router;
pub mod ui;

pub const AUTHOR: &str = "Kiln Contributors";

/// Static description of a built-in unit.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinUnit {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub dependencies: &'static [&'static str],
    pub enabled: fn(&ConfigRecord) -> bool,
    pub blueprint: Blueprint,
}

impl BuiltinUnit {
    pub fn metadata(&self) -> UnitMetadata {
        UnitMetadata::new(self.description).with_author(AUTHOR)
    }

    pub fn info(&self) -> UnitInfo {
        UnitInfo {
            name: self.name.to_string(),
            version: self.version.to_string(),
            dependencies: self.dependencies.iter().map(|d| (*d).to_string()).collect(),
            metadata: self.metadata(),
        }
    }

    pub fn is_enabled(&self, record: &ConfigRecord) -> bool {
        (self.enabled)(record)
    }

    /// Bind this descriptor to a record, producing a runnable unit.
    pub fn instantiate(&self, record: Arc<ConfigRecord>) -> TemplateUnit {
        TemplateUnit::builder(self.name, self.blueprint)
            .version(self.version)
            .depends_on(self.dependencies.iter().copied())
            .metadata(self.metadata())
            .build(record)
    }
}

pub(crate) fn always(_: &ConfigRecord) -> bool {
    true
}

const CATALOG: &[BuiltinUnit] = &[
    project::UNIT,
    config::UNIT,
    database::UNIT,
    router::UNIT,
    middleware::UNIT,
    events::UNIT,
    ui::UNIT,
    docker::UNIT,
];

/// Every built-in unit, in registration order.
pub fn catalog() -> &'static [BuiltinUnit] {
    CATALOG
}

pub fn find(name: &str) -> Option<&'static BuiltinUnit> {
    CATALOG.iter().find(|unit| unit.name == name)
}

/// Units the record asks for, ready to register.
pub fn select(record: &Arc<ConfigRecord>) -> Vec<Box<dyn GenerationUnit>> {
    CATALOG
        .iter()
        .filter(|unit| unit.is_enabled(record))
        .map(|unit| {
            debug!(unit = unit.name, "Selected built-in unit");
            Box::new(unit.instantiate(Arc::clone(record))) as Box<dyn GenerationUnit>
        })
        .collect()
}
