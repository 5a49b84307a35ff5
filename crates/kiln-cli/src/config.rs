//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `KILN_DEFAULTS__BACKEND=gin`
//! 3. Config file: `--config FILE` if given, otherwise the user config file
//!    and then `./kiln.toml`, both optional
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat, Source};
use serde::{Deserialize, Serialize};

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = "kiln.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default values for new projects.
    pub defaults: Defaults,
    /// Output settings.
    pub output: OutputConfig,
}

/// Fallbacks for `kiln new` options the user did not pass.
///
/// Choices are kept as strings here and parsed by the command, so a typo in a
/// config file is reported as a configuration error rather than a parse
/// failure at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub backend: String,
    pub database: String,
    pub ui: String,
    pub port: u16,
    pub author: Option<String>,
    pub output_dir: PathBuf,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            backend: "chi".into(),
            database: "none".into(),
            ui: "none".into(),
            port: 8080,
            author: None,
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl AppConfig {
    /// Load configuration, layering files and environment over defaults.
    ///
    /// An explicit `config_file` must exist; the implicit locations are
    /// skipped when absent.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let mut builder = Config::builder();

        match config_file {
            Some(path) => {
                builder = builder.add_source(toml_file(path, true));
            }
            None => {
                if let Some(user) = Self::config_path() {
                    builder = builder.add_source(toml_file(&user, false));
                }
                builder = builder.add_source(toml_file(Path::new(LOCAL_CONFIG_FILE), false));
            }
        }

        let config = builder
            .add_source(
                Environment::with_prefix("KILN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to read configuration sources")?;

        config
            .try_deserialize()
            .context("configuration has an unexpected shape")
    }

    /// Path to the user configuration file, if the platform has one.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "kiln", "kiln")
            .map(|d| d.config_dir().join("config.toml"))
    }
}

fn toml_file(path: &Path, required: bool) -> impl Source + Send + Sync + 'static {
    File::from(path).format(FileFormat::Toml).required(required)
}
