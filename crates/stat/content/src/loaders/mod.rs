//! Content loaders for reading stat data from files.

pub mod aggregates;
pub mod config;
pub mod domain;
pub mod factory;
pub mod flags;
pub mod modifiers;

pub use aggregates::{AggregateLoader, AggregateSpec, LoadedAggregate};
pub use config::ConfigLoader;
pub use domain::DomainLoader;
pub use factory::ContentFactory;
pub use flags::FlagSetLoader;
pub use modifiers::{ModifierLoader, ModifierSpec};

use std::path::Path;

use anyhow::Context;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    tracing::debug!(target: "stat_content", path = %path.display(), "reading content file");
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file {}", path.display()))
}
