//! The `ConfigRecord` value object and its typestate builder.
//!
//! A `ConfigRecord` carries every field a template payload may reference.
//! It is built once per generation run by the caller, shared as
//! `Arc<ConfigRecord>`, and never mutated afterwards: all fields are private
//! and only exposed through getters.
//!
//! Values that would make a run non-reproducible (the current year, the
//! migration timestamp, the fingerprint) are *inputs* here. The record itself
//! never reads the clock or a random source, so two runs with equal records
//! produce equal trees.
//!
//! # Domain purity
//!
//! This module must not import `tracing`.

use std::marker::PhantomData;

use serde::Serialize;

use crate::domain::{
    error::DomainError,
    value_objects::{Backend, Database, UiFramework},
};

pub const DEFAULT_PORT: u16 = 8080;

/// Immutable description of the project to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    app_name: String,
    module_path: String,
    description: String,
    author: String,
    backend: Backend,
    database: Database,
    ui: UiFramework,
    port: u16,
    fingerprint: String,
    year: i32,
    timestamp: String,
    docker: bool,
    events: bool,
}

impl ConfigRecord {
    /// Start building a new record.
    pub fn builder() -> ConfigRecordBuilder<NoName> {
        ConfigRecordBuilder::new()
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }
    pub fn module_path(&self) -> &str {
        &self.module_path
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn author(&self) -> &str {
        &self.author
    }
    pub const fn backend(&self) -> Backend {
        self.backend
    }
    pub const fn database(&self) -> Database {
        self.database
    }
    pub const fn ui(&self) -> UiFramework {
        self.ui
    }
    pub const fn port(&self) -> u16 {
        self.port
    }
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
    pub const fn year(&self) -> i32 {
        self.year
    }
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
    pub const fn docker(&self) -> bool {
        self.docker
    }
    pub const fn events(&self) -> bool {
        self.events
    }

    /// Name of the directory every generated file lives under.
    ///
    /// Lower-cased so that `MyApp` and `myapp` land in the same place on
    /// case-insensitive and case-sensitive filesystems alike.
    pub fn project_dir(&self) -> String {
        self.app_name.to_lowercase()
    }

    /// Flattened view handed to the template engine.
    ///
    /// Contains every stored field plus the derived casings. Anything not in
    /// this view is undefined from a template's point of view.
    pub fn view(&self) -> RecordView<'_> {
        let snake = to_snake_case(&self.app_name);
        RecordView {
            app_name: &self.app_name,
            database_url: self.database.default_url(&snake),
            app_name_snake: snake,
            app_name_kebab: to_kebab_case(&self.app_name),
            app_name_pascal: to_pascal_case(&self.app_name),
            project_dir: self.project_dir(),
            module_path: &self.module_path,
            description: &self.description,
            author: &self.author,
            backend: self.backend.as_str(),
            database: self.database.as_str(),
            ui: self.ui.as_str(),
            port: self.port,
            fingerprint: &self.fingerprint,
            year: self.year,
            timestamp: &self.timestamp,
            docker: self.docker,
            events: self.events,
            has_database: self.database.is_some(),
            has_sql: self.database.is_sql(),
            has_ui: self.ui.is_some(),
        }
    }

    /// Validate this record's internal consistency.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.app_name.trim().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "app_name" });
        }
        if self.app_name.starts_with('.') {
            return Err(DomainError::InvalidConfig(format!(
                "app name '{}' cannot start with '.'",
                self.app_name
            )));
        }
        if self.app_name.contains(['/', '\\']) {
            return Err(DomainError::InvalidConfig(format!(
                "app name '{}' cannot contain path separators",
                self.app_name
            )));
        }
        if self.module_path.trim().is_empty() || self.module_path.contains(char::is_whitespace)
        {
            return Err(DomainError::InvalidConfig(format!(
                "invalid module path '{}'",
                self.module_path
            )));
        }
        if self.port == 0 {
            return Err(DomainError::InvalidConfig("port must be non-zero".into()));
        }
        if self.timestamp.len() != 14 || !self.timestamp.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidConfig(format!(
                "timestamp '{}' must be 14 digits (YYYYMMDDHHMMSS)",
                self.timestamp
            )));
        }
        Ok(())
    }
}

/// Serializable, borrowed projection of a [`ConfigRecord`].
#[derive(Debug, Clone, Serialize)]
pub struct RecordView<'a> {
    pub app_name: &'a str,
    pub app_name_snake: String,
    pub app_name_kebab: String,
    pub app_name_pascal: String,
    pub project_dir: String,
    pub module_path: &'a str,
    pub description: &'a str,
    pub author: &'a str,
    pub backend: &'static str,
    pub database: &'static str,
    /// Default local connection string; empty without a database.
    pub database_url: String,
    pub ui: &'static str,
    pub port: u16,
    pub fingerprint: &'a str,
    pub year: i32,
    pub timestamp: &'a str,
    pub docker: bool,
    pub events: bool,
    pub has_database: bool,
    pub has_sql: bool,
    pub has_ui: bool,
}

// ── Typestate markers ─────────────────────────────────────────────────────────

/// Marker: app name has not yet been set.
pub struct NoName;
/// Marker: app name has been set; the record can now be built.
pub struct HasName;

// ── Builder ───────────────────────────────────────────────────────────────────

/// Typestate builder for [`ConfigRecord`].
///
/// Compile-time guarantee: `build` is only reachable once `app_name` is set.
pub struct ConfigRecordBuilder<N> {
    app_name: String,
    module_path: Option<String>,
    description: String,
    author: String,
    backend: Backend,
    database: Database,
    ui: UiFramework,
    port: u16,
    fingerprint: String,
    year: i32,
    timestamp: String,
    docker: bool,
    events: bool,
    _marker: PhantomData<N>,
}

impl ConfigRecordBuilder<NoName> {
    pub fn new() -> Self {
        Self {
            app_name: String::new(),
            module_path: None,
            description: String::new(),
            author: String::new(),
            backend: Backend::default(),
            database: Database::default(),
            ui: UiFramework::default(),
            port: DEFAULT_PORT,
            fingerprint: String::new(),
            year: 1970,
            timestamp: "19700101000000".into(),
            docker: false,
            events: false,
            _marker: PhantomData,
        }
    }

    /// Set the application name. This transitions the builder to `HasName`.
    pub fn app_name(self, name: impl Into<String>) -> ConfigRecordBuilder<HasName> {
        ConfigRecordBuilder {
            app_name: name.into(),
            module_path: self.module_path,
            description: self.description,
            author: self.author,
            backend: self.backend,
            database: self.database,
            ui: self.ui,
            port: self.port,
            fingerprint: self.fingerprint,
            year: self.year,
            timestamp: self.timestamp,
            docker: self.docker,
            events: self.events,
            _marker: PhantomData,
        }
    }
}

impl Default for ConfigRecordBuilder<NoName> {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigRecordBuilder<HasName> {
    pub fn module_path(mut self, module: impl Into<String>) -> Self {
        self.module_path = Some(module.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn database(mut self, database: Database) -> Self {
        self.database = database;
        self
    }

    pub fn ui(mut self, ui: UiFramework) -> Self {
        self.ui = ui;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = fingerprint.into();
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    /// Migration timestamp, `YYYYMMDDHHMMSS`.
    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    pub fn docker(mut self, enabled: bool) -> Self {
        self.docker = enabled;
        self
    }

    pub fn events(mut self, enabled: bool) -> Self {
        self.events = enabled;
        self
    }

    /// Build and validate the record.
    ///
    /// An unset module path defaults to `github.com/<kebab>/<kebab>`.
    pub fn build(self) -> Result<ConfigRecord, DomainError> {
        let module_path = self.module_path.unwrap_or_else(|| {
            let kebab = to_kebab_case(&self.app_name);
            format!("github.com/{kebab}/{kebab}")
        });

        let record = ConfigRecord {
            app_name: self.app_name,
            module_path,
            description: self.description,
            author: self.author,
            backend: self.backend,
            database: self.database,
            ui: self.ui,
            port: self.port,
            fingerprint: self.fingerprint,
            year: self.year,
            timestamp: self.timestamp,
            docker: self.docker,
            events: self.events,
        };

        record.validate()?;
        Ok(record)
    }
}

// ============================================================================
// Case conversion
// ============================================================================

fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

fn to_pascal_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Split an identifier into lower-cased words.
///
/// Boundaries: `_`, `-`, `.` and whitespace; a lower→upper transition
/// (`myApp`); the last capital of an acronym followed by a lower-case letter
/// (`HTTPServer` → `http`, `server`).
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = input.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        let acronym_end = c.is_uppercase()
            && i > 0
            && chars[i - 1].is_uppercase()
            && chars.get(i + 1).is_some_and(|n| n.is_lowercase());
        let camel = c.is_uppercase() && i > 0 && chars[i - 1].is_lowercase();

        if (acronym_end || camel) && !current.is_empty() {
            words.push(current.to_lowercase());
            current.clear();
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}
