//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use kiln_core::domain::{Backend, Database, UiFramework};

pub mod global;
pub use global::GlobalArgs;

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "kiln",
    bin_name = "kiln",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Deterministic Go web-service generator",
    long_about = "Kiln generates a ready-to-build Go web service from a handful \
                  of choices: HTTP framework, database driver, front end, and \
                  optional Docker and event-bus support.",
    after_help = "EXAMPLES:\n\
        \x20 kiln new shop --backend chi --db postgres\n\
        \x20 kiln new blog --backend gin --ui htmx --docker\n\
        \x20 kiln list --format json\n\
        \x20 kiln completions bash > /usr/share/bash-completion/completions/kiln",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a new project.
    #[command(
        visible_alias = "n",
        about = "Generate a new project",
        after_help = "EXAMPLES:\n\
            \x20 kiln new shop\n\
            \x20 kiln new shop --backend echo --db sqlite --events\n\
            \x20 kiln new shop --ui react --docker --output ./services\n\
            \x20 kiln new shop --dry-run"
    )]
    New(NewArgs),

    /// List the built-in generation units.
    #[command(
        visible_alias = "ls",
        about = "List built-in generation units",
        after_help = "EXAMPLES:\n\
            \x20 kiln list\n\
            \x20 kiln list --format json"
    )]
    List(ListArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 kiln completions bash > ~/.local/share/bash-completion/completions/kiln\n\
            \x20 kiln completions zsh  > ~/.zfunc/_kiln\n\
            \x20 kiln completions fish > ~/.config/fish/completions/kiln.fish"
    )]
    Completions(CompletionsArgs),
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `kiln new`.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// Application name. The project is created in a lower-cased directory
    /// of the same name under `--output`.
    #[arg(value_name = "NAME", help = "Application name")]
    pub name: String,

    #[arg(
        short = 'b',
        long = "backend",
        value_name = "FRAMEWORK",
        value_enum,
        help = "HTTP framework [default: from config, else chi]"
    )]
    pub backend: Option<BackendArg>,

    #[arg(
        short = 'd',
        long = "db",
        value_name = "DRIVER",
        value_enum,
        help = "Database driver [default: from config, else none]"
    )]
    pub database: Option<DatabaseArg>,

    #[arg(
        short = 'u',
        long = "ui",
        value_name = "FRAMEWORK",
        value_enum,
        help = "Front-end framework [default: from config, else none]"
    )]
    pub ui: Option<UiArg>,

    #[arg(short = 'p', long = "port", value_name = "PORT", help = "Default HTTP port")]
    pub port: Option<u16>,

    /// Go module path. Defaults to `github.com/<name>/<name>`.
    #[arg(short = 'm', long = "module", value_name = "PATH", help = "Go module path")]
    pub module: Option<String>,

    #[arg(long = "description", value_name = "TEXT", help = "One-line project description")]
    pub description: Option<String>,

    #[arg(long = "author", value_name = "NAME", help = "Author for the LICENSE file")]
    pub author: Option<String>,

    #[arg(long = "docker", help = "Add a Dockerfile and docker-compose stack")]
    pub docker: bool,

    #[arg(long = "events", help = "Add an in-process event bus")]
    pub events: bool,

    /// Directory the project directory is created in.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Parent directory (default: from config, else current directory)"
    )]
    pub output: Option<PathBuf>,

    /// Fixed fingerprint, for reproducible output. A random one is used otherwise.
    #[arg(long = "fingerprint", value_name = "ID", help = "Generation fingerprint")]
    pub fingerprint: Option<String>,

    /// Write into an existing directory, overwriting generated files.
    #[arg(long = "force", help = "Generate into an existing directory")]
    pub force: bool,

    /// Preview the unit order and files without writing anything.
    #[arg(long = "dry-run", help = "Show what would be created without creating")]
    pub dry_run: bool,
}

/// HTTP framework choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum BackendArg {
    Chi,
    Echo,
    Fiber,
    Gin,
    /// Plain `net/http`.
    #[value(alias = "stdlib")]
    Std,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Chi => Self::Chi,
            BackendArg::Echo => Self::Echo,
            BackendArg::Fiber => Self::Fiber,
            BackendArg::Gin => Self::Gin,
            BackendArg::Std => Self::Std,
        }
    }
}

/// Database driver choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum DatabaseArg {
    None,
    #[value(aliases = ["postgresql", "pg"])]
    Postgres,
    #[value(alias = "mariadb")]
    Mysql,
    #[value(alias = "sqlite3")]
    Sqlite,
    #[value(alias = "mongodb")]
    Mongo,
}

impl From<DatabaseArg> for Database {
    fn from(arg: DatabaseArg) -> Self {
        match arg {
            DatabaseArg::None => Self::None,
            DatabaseArg::Postgres => Self::Postgres,
            DatabaseArg::Mysql => Self::Mysql,
            DatabaseArg::Sqlite => Self::Sqlite,
            DatabaseArg::Mongo => Self::Mongo,
        }
    }
}

/// Front-end choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum UiArg {
    None,
    Htmx,
    React,
    Vue,
    Svelte,
}

impl From<UiArg> for UiFramework {
    fn from(arg: UiArg) -> Self {
        match arg {
            UiArg::None => Self::None,
            UiArg::Htmx => Self::Htmx,
            UiArg::React => Self::React,
            UiArg::Vue => Self::Vue,
            UiArg::Svelte => Self::Svelte,
        }
    }
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `kiln list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `kiln completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── tests ─────────────────────────────────────────────────────────────────────
