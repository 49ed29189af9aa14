//! Category flag sets and the ALL / ANY / EXACT matching predicates.

use std::str::FromStr;
use std::sync::Arc;

use super::bits::BitVector;
use super::{Category, CategoryDomain, CategoryId};
use crate::error::{ErrorKind, StatError};

/// How a list of categories is compared against a flag set.
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
pub enum MatchKind {
    /// Every listed category is set.
    All,
    /// At least one listed category is set.
    Any,
    /// The set holds exactly the listed categories.
    Exact,
}

impl MatchKind {
    /// Parse a match kind name, reporting unknown names as a [`FlagError`].
    pub fn parse(name: &str) -> Result<Self, FlagError> {
        Self::from_str(name).map_err(|_| FlagError::UnknownMatchKind(name.to_owned()))
    }
}

/// Errors raised by flag set operations and persisted flag decoding.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FlagError {
    #[error("category index {index} is outside the domain ({len} categories)")]
    UnknownCategory { index: usize, len: usize },

    #[error("category `{0}` is not part of the domain")]
    UnknownName(String),

    #[error("persisted flags hold {bits} bits but {names} category names")]
    CorruptBits { bits: usize, names: usize },

    #[error("persisted flags contain {found:?} at position {position}, expected '0' or '1'")]
    InvalidBit { position: usize, found: char },

    #[error("unknown match kind `{0}`")]
    UnknownMatchKind(String),
}

impl StatError for FlagError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownCategory { .. } | Self::UnknownName(_) => ErrorKind::Lookup,
            Self::CorruptBits { .. } | Self::InvalidBit { .. } => ErrorKind::Data,
            Self::UnknownMatchKind(_) => ErrorKind::Invariant,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCategory { .. } => "FLAGS_UNKNOWN_CATEGORY",
            Self::UnknownName(_) => "FLAGS_UNKNOWN_NAME",
            Self::CorruptBits { .. } => "FLAGS_CORRUPT_BITS",
            Self::InvalidBit { .. } => "FLAGS_INVALID_BIT",
            Self::UnknownMatchKind(_) => "FLAGS_UNKNOWN_MATCH_KIND",
        }
    }
}

/// Boolean vector over a [`CategoryDomain`].
///
/// Every modifier and aggregate owns its own flag set; sets are cloned, never
/// shared. Besides the bits, a set remembers category names that were active
/// when it was persisted but are missing from the live domain (see
/// [`CategoryFlagSet::repair`]).
#[derive(Clone, Debug)]
pub struct CategoryFlagSet {
    pub(super) domain: Arc<CategoryDomain>,
    pub(super) bits: BitVector,
    pub(super) pending: Vec<String>,
}

impl CategoryFlagSet {
    /// Create an empty set over `domain`.
    pub fn new(domain: Arc<CategoryDomain>) -> Self {
        let bits = BitVector::new(domain.len());
        Self {
            domain,
            bits,
            pending: Vec::new(),
        }
    }

    /// Create a set with the given categories active.
    pub fn with<C, I>(domain: Arc<CategoryDomain>, categories: I) -> Result<Self, FlagError>
    where
        C: Category,
        I: IntoIterator<Item = C>,
    {
        let mut flags = Self::new(domain);
        flags.set_many(true, categories)?;
        Ok(flags)
    }

    /// Create a set with the named categories active.
    pub fn from_names<I, S>(domain: Arc<CategoryDomain>, names: I) -> Result<Self, FlagError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flags = Self::new(domain);
        for name in names {
            flags.set_named(name.as_ref(), true)?;
        }
        Ok(flags)
    }

    pub fn domain(&self) -> &Arc<CategoryDomain> {
        &self.domain
    }

    /// Number of slots, equal to the domain cardinality.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns true if no category is active.
    pub fn is_empty(&self) -> bool {
        !self.bits.any()
    }

    /// Number of active categories.
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn set(&mut self, category: impl Category, value: bool) -> Result<(), FlagError> {
        let index = category.index();
        if self.bits.set(index, value) {
            Ok(())
        } else {
            Err(FlagError::UnknownCategory {
                index,
                len: self.bits.len(),
            })
        }
    }

    /// Set every listed category to `value`.
    ///
    /// Stops at the first category outside the domain; earlier writes stay applied.
    pub fn set_many<C, I>(&mut self, value: bool, categories: I) -> Result<(), FlagError>
    where
        C: Category,
        I: IntoIterator<Item = C>,
    {
        categories
            .into_iter()
            .try_for_each(|category| self.set(category, value))
    }

    pub fn set_named(&mut self, name: &str, value: bool) -> Result<(), FlagError> {
        let id = self
            .domain
            .id_of(name)
            .ok_or_else(|| FlagError::UnknownName(name.to_owned()))?;
        self.set(id, value)
    }

    pub fn has(&self, category: impl Category) -> bool {
        self.bits.get(category.index())
    }

    pub fn has_baseline(&self) -> bool {
        self.has(CategoryId::BASELINE)
    }

    /// Test the listed categories against this set.
    ///
    /// Categories outside the domain count as unset.
    pub fn matches<C, I>(&self, kind: MatchKind, categories: I) -> bool
    where
        C: Category,
        I: IntoIterator<Item = C>,
    {
        let mut categories = categories.into_iter();
        match kind {
            MatchKind::All => categories.all(|category| self.has(category)),
            MatchKind::Any => categories.any(|category| self.has(category)),
            MatchKind::Exact => {
                let mut listed = BitVector::new(self.bits.len());
                for category in categories {
                    if !listed.set(category.index(), true) {
                        return false;
                    }
                }
                listed == self.bits
            }
        }
    }

    /// Returns true if every category in `required` is active here, with the
    /// baseline category ignored on both sides.
    ///
    /// This is the test used between a modifier's flags and an aggregate's
    /// required flags: `{Baseline, Fire}` satisfies both `{Fire}` and
    /// `{Baseline, Fire}`.
    pub fn satisfies(&self, required: &CategoryFlagSet) -> bool {
        required
            .bits
            .is_subset_except(&self.bits, CategoryId::BASELINE.0)
    }

    /// Active categories in index order.
    pub fn active_categories(&self) -> Vec<CategoryId> {
        self.bits.iter_ones().map(CategoryId).collect()
    }

    /// Names of the active categories in index order.
    pub fn active_names(&self) -> Vec<&str> {
        self.bits
            .iter_ones()
            .filter_map(|index| self.domain.name(CategoryId(index)))
            .collect()
    }

    /// Names that were active when persisted but are absent from the live domain.
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Clear every category, including pending names.
    pub fn clear(&mut self) {
        self.bits.clear();
        self.pending.clear();
    }

    pub fn bits(&self) -> &BitVector {
        &self.bits
    }
}

impl PartialEq for CategoryFlagSet {
    fn eq(&self, other: &Self) -> bool {
        super::same_domain(&self.domain, &other.domain)
            && self.bits == other.bits
            && self.pending == other.pending
    }
}

impl core::fmt::Display for CategoryFlagSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{{{}}}", self.active_names().join(", "))
    }
}
