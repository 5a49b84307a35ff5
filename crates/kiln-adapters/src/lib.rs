//! Infrastructure adapters for Kiln.
//!
//! This crate implements the ports defined in `kiln_core::application::ports`
//! and ships the built-in generation units. All real I/O lives here.

pub mod filesystem;
pub mod renderer;
pub mod units;

pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use renderer::MiniJinjaRenderer;
pub use units::{BuiltinUnit, catalog, select};
