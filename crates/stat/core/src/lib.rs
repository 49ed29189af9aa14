//! Flag-indexed incremental stat aggregation.
//!
//! `stat-core` computes live numeric stats from a pool of tagged modifiers
//! without recomputing from scratch on every change. Modifiers carry a
//! [`CategoryFlagSet`]; aggregates declare the categories they require and are
//! notified by the [`Registry`] whenever a modifier enters or leaves the pool.
//!
//! # Architecture
//!
//! ```text
//! [ CategoryDomain ]     ordered category names, index 0 = baseline
//!        ↓
//! [ CategoryFlagSet ]    resizable bit vector + schema-drift repair
//!        ↓
//! [ Modifier ]           magnitude × kind × source × flags (immutable)
//!        ↓
//! [ Aggregate ]          running flat / percent / multiplicative totals
//!        ↓
//! [ Registry ]           modifier pool, aggregate catalogue, notifications
//! ```
//!
//! ## Value composition
//!
//! `value = flat × percent × multiplicative`, where child aggregates fold in
//! their flat sum, their percent offset (`percent - 1`) and their product.
//!
//! All operations are synchronous and single-writer: mutation takes
//! `&mut Registry`.
pub mod aggregate;
pub mod category;
pub mod config;
pub mod error;
pub mod modifier;
pub mod registry;

pub use aggregate::{
    Aggregate, AggregateBreakdown, AggregateId, AggregateKey, AggregateView, Contribution,
    Totals, canonical_signature,
};
pub use category::{
    BitVector, Category, CategoryBinding, CategoryDomain, CategoryFlagSet, CategoryId,
    DomainError, FlagError, MatchKind, PersistedFlags, RESERVED_NAME_CHARS, RepairReport,
};
pub use config::RegistryConfig;
pub use error::{ErrorKind, StatError};
pub use modifier::{Modifier, ModifierError, ModifierId, ModifierKind, SourceId};
pub use registry::{Registry, RegistryError};
