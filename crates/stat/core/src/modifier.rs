//! Modifiers - tagged numeric contributions to aggregates.
//!
//! A modifier is immutable once built. The registry hands out a [`ModifierId`]
//! when it is added; that id is the modifier's identity for removal.

use std::sync::Arc;

use crate::category::{Category, CategoryDomain, CategoryFlagSet, FlagError};
use crate::error::{ErrorKind, StatError};

/// How a modifier's magnitude is folded into an aggregate.
///
/// - **Flat**: added to the flat total (e.g., +10 damage)
/// - **Percent**: added to the percent total, which starts at 1 (0.5 = +50%)
/// - **Multiplicative**: multiplied into the product (1.2 = ×1.2)
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ModifierKind {
    Flat,
    Percent,
    Multiplicative,
}

/// Opaque identity of whatever granted a modifier (an item, a buff, an aura).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceId(pub u64);

impl core::fmt::Display for SourceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "src{}", self.0)
    }
}

/// Handle to a modifier held by a [`Registry`](crate::Registry).
///
/// Ids are allocated in increasing order and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModifierId(pub(crate) u64);

impl ModifierId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for ModifierId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "mod{}", self.0)
    }
}

/// Errors raised while building a [`Modifier`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ModifierError {
    #[error("a modifier needs at least one category")]
    EmptyCategories,

    #[error("modifier magnitude must be finite, got {0}")]
    NonFiniteMagnitude(f64),

    #[error(transparent)]
    Flags(#[from] FlagError),
}

impl StatError for ModifierError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyCategories | Self::NonFiniteMagnitude(_) => ErrorKind::Construction,
            Self::Flags(inner) => inner.kind(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyCategories => "MODIFIER_EMPTY_CATEGORIES",
            Self::NonFiniteMagnitude(_) => "MODIFIER_NON_FINITE",
            Self::Flags(inner) => inner.error_code(),
        }
    }
}

/// An immutable contribution to every aggregate whose requirements its flags satisfy.
///
/// # Example
/// ```
/// # use stat_core::*;
/// let domain = CategoryDomain::new(["Baseline", "Fire"]).unwrap().shared();
/// let fire = domain.id_of("Fire").unwrap();
///
/// let modifier = Modifier::new(&domain, 10.0, ModifierKind::Flat, SourceId(1), [fire]).unwrap();
/// assert_eq!(modifier.magnitude(), 10.0);
/// assert!(!modifier.is_baseline());
///
/// let empty: [CategoryId; 0] = [];
/// assert!(Modifier::new(&domain, 1.0, ModifierKind::Flat, SourceId(1), empty).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Modifier {
    magnitude: f64,
    kind: ModifierKind,
    source: SourceId,
    flags: CategoryFlagSet,
}

impl Modifier {
    /// Build a modifier tagged with `categories`.
    pub fn new<C, I>(
        domain: &Arc<CategoryDomain>,
        magnitude: f64,
        kind: ModifierKind,
        source: SourceId,
        categories: I,
    ) -> Result<Self, ModifierError>
    where
        C: Category,
        I: IntoIterator<Item = C>,
    {
        let flags = CategoryFlagSet::with(Arc::clone(domain), categories)?;
        Self::from_flags(magnitude, kind, source, flags)
    }

    /// Build a modifier from an existing flag set.
    pub fn from_flags(
        magnitude: f64,
        kind: ModifierKind,
        source: SourceId,
        flags: CategoryFlagSet,
    ) -> Result<Self, ModifierError> {
        if flags.is_empty() {
            return Err(ModifierError::EmptyCategories);
        }
        if !magnitude.is_finite() {
            return Err(ModifierError::NonFiniteMagnitude(magnitude));
        }
        Ok(Self {
            magnitude,
            kind,
            source,
            flags,
        })
    }

    /// Shorthand for a [`ModifierKind::Flat`] modifier.
    pub fn flat<C, I>(
        domain: &Arc<CategoryDomain>,
        magnitude: f64,
        source: SourceId,
        categories: I,
    ) -> Result<Self, ModifierError>
    where
        C: Category,
        I: IntoIterator<Item = C>,
    {
        Self::new(domain, magnitude, ModifierKind::Flat, source, categories)
    }

    /// Shorthand for a [`ModifierKind::Percent`] modifier.
    pub fn percent<C, I>(
        domain: &Arc<CategoryDomain>,
        magnitude: f64,
        source: SourceId,
        categories: I,
    ) -> Result<Self, ModifierError>
    where
        C: Category,
        I: IntoIterator<Item = C>,
    {
        Self::new(domain, magnitude, ModifierKind::Percent, source, categories)
    }

    /// Shorthand for a [`ModifierKind::Multiplicative`] modifier.
    pub fn multiplicative<C, I>(
        domain: &Arc<CategoryDomain>,
        magnitude: f64,
        source: SourceId,
        categories: I,
    ) -> Result<Self, ModifierError>
    where
        C: Category,
        I: IntoIterator<Item = C>,
    {
        Self::new(
            domain,
            magnitude,
            ModifierKind::Multiplicative,
            source,
            categories,
        )
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn kind(&self) -> ModifierKind {
        self.kind
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    pub fn flags(&self) -> &CategoryFlagSet {
        &self.flags
    }

    /// Returns true if the modifier carries the baseline category.
    pub fn is_baseline(&self) -> bool {
        self.flags.has_baseline()
    }

    /// Baseline-exempt ALL test against an aggregate's required flags.
    pub fn matches(&self, required: &CategoryFlagSet) -> bool {
        self.flags.satisfies(required)
    }
}
