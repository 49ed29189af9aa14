//! Common error infrastructure for stat-core.
//!
//! Domain-specific errors (`DomainError`, `FlagError`, `ModifierError`,
//! `RegistryError`) live next to the types they validate. This module provides
//! the classification shared by all of them.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each component has its own error enum with specific variants
//! - **Classification**: Every error reports the [`ErrorKind`] it belongs to
//! - **No Silent Recovery**: Errors are returned to the caller, never retried

/// Category of a stat-core error.
///
/// All errors are contract violations reported immediately; the kind tells the
/// caller which contract was broken:
/// - **Construction**: an object could not be built from the given inputs
/// - **Lookup**: an aggregate or category was missing, or already present
/// - **Data**: persisted data is corrupt
/// - **Invariant**: internal bookkeeping disagrees with itself
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// Invalid constructor input.
    ///
    /// Examples: empty category list, empty domain, too few children
    Construction,

    /// Missing or duplicate catalogue entry.
    ///
    /// Examples: aggregate not found, aggregate already exists
    Lookup,

    /// Corrupt persisted data.
    ///
    /// Examples: bit string length differs from the stored name list
    Data,

    /// Internal inconsistency or unreachable input.
    ///
    /// Examples: unknown match kind, signature index out of sync
    /// These indicate bugs and should be investigated.
    Invariant,
}

impl ErrorKind {
    /// Returns a human-readable name for this kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Construction => "construction",
            Self::Lookup => "lookup",
            Self::Data => "data",
            Self::Invariant => "invariant",
        }
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Invariant)
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common trait for all stat-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Wrapped errors delegate to the inner error's classification
pub trait StatError: core::fmt::Display + core::fmt::Debug {
    /// Returns the kind of contract this error violates.
    fn kind(&self) -> ErrorKind;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for log fields and assertions in tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
