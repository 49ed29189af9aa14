//! Data-driven stat content and loaders.
//!
//! This crate turns data files into `stat-core` values:
//! - Category domains (data-driven via RON)
//! - Modifier definitions (data-driven via RON)
//! - Aggregate definitions (data-driven via RON)
//! - Registry configuration (data-driven via TOML)
//! - Persisted flag sets (JSON)
//!
//! Category names in data files are resolved against the live domain at load
//! time, so content never depends on category indices.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    AggregateLoader, AggregateSpec, ConfigLoader, ContentFactory, DomainLoader, FlagSetLoader,
    LoadResult, LoadedAggregate, ModifierLoader, ModifierSpec,
};
