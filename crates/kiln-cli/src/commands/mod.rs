//! Subcommand handlers. Each module exposes a single `execute` function.

pub mod completions;
pub mod list;
pub mod new;
