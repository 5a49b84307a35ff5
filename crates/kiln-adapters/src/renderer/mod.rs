//! Template renderer adapters.

mod minijinja;

pub use self::minijinja::MiniJinjaRenderer;
