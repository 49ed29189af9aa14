//! Category domains and the flag sets indexed by them.
//!
//! A [`CategoryDomain`] is the ordered list of category names current for a
//! build. Index 0 is always the **baseline** category, a wildcard that is
//! ignored when modifier flags are tested against aggregate requirements.
//!
//! Typed enums take part through [`Category`]:
//!
//! ```
//! use stat_core::{Category, CategoryDomain};
//!
//! #[derive(Clone, Copy, Debug, strum::VariantNames)]
//! enum Tag {
//!     Baseline,
//!     Fire,
//!     Melee,
//! }
//!
//! impl Category for Tag {
//!     fn index(self) -> usize {
//!         self as usize
//!     }
//! }
//!
//! let domain = CategoryDomain::of::<Tag>().unwrap();
//! assert_eq!(domain.len(), 3);
//! assert_eq!(domain.name(Tag::Fire.id()), Some("Fire"));
//! ```

mod bits;
mod flags;
mod repair;

pub use bits::BitVector;
pub use flags::{CategoryFlagSet, FlagError, MatchKind};
pub use repair::{CategoryBinding, PersistedFlags, RepairReport};

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::error::{ErrorKind, StatError};

/// Zero-based position of a category inside its domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryId(pub usize);

impl CategoryId {
    /// The reserved wildcard category.
    pub const BASELINE: Self = Self(RegistryConfig::BASELINE_INDEX);

    pub const fn is_baseline(self) -> bool {
        self.0 == RegistryConfig::BASELINE_INDEX
    }
}

impl core::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything that addresses a slot in a category domain.
///
/// Implement this for a fieldless enum whose discriminants follow the
/// declaration order of its `strum::VariantNames`.
pub trait Category: Copy {
    /// Zero-based index within the domain.
    fn index(self) -> usize;

    fn id(self) -> CategoryId {
        CategoryId(self.index())
    }
}

impl Category for CategoryId {
    fn index(self) -> usize {
        self.0
    }
}

impl Category for usize {
    fn index(self) -> usize {
        self
    }
}

/// Characters that delimit names inside aggregate signatures.
pub const RESERVED_NAME_CHARS: [char; 3] = ['+', '(', ')'];

/// Errors raised while building a [`CategoryDomain`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("category domain has no categories")]
    Empty,

    #[error("category at index {index} has an empty name")]
    BlankName { index: usize },

    #[error("category `{name}` at index {index} contains one of the reserved characters `+ ( )`")]
    ReservedCharacter { index: usize, name: String },

    #[error("category `{name}` appears at both index {first} and index {second}")]
    DuplicateName {
        name: String,
        first: usize,
        second: usize,
    },
}

impl StatError for DomainError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Construction
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "DOMAIN_EMPTY",
            Self::BlankName { .. } => "DOMAIN_BLANK_NAME",
            Self::ReservedCharacter { .. } => "DOMAIN_RESERVED_CHARACTER",
            Self::DuplicateName { .. } => "DOMAIN_DUPLICATE_NAME",
        }
    }
}

/// Ordered, closed set of category names.
///
/// Domains are immutable once built and shared between flag sets through
/// `Arc`. Two domains are equal when their name lists are equal.
#[derive(Clone, Debug)]
pub struct CategoryDomain {
    names: Vec<String>,
    lookup: HashMap<String, CategoryId>,
}

impl CategoryDomain {
    /// Build a domain from an ordered name list.
    ///
    /// The first name becomes the baseline category. Names must be non-empty,
    /// unique, and free of [`RESERVED_NAME_CHARS`].
    pub fn new<I, S>(names: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(DomainError::Empty);
        }

        let mut lookup = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(DomainError::BlankName { index });
            }
            if name.contains(RESERVED_NAME_CHARS) {
                return Err(DomainError::ReservedCharacter {
                    index,
                    name: name.clone(),
                });
            }
            if let Some(first) = lookup.insert(name.clone(), CategoryId(index)) {
                return Err(DomainError::DuplicateName {
                    name: name.clone(),
                    first: first.0,
                    second: index,
                });
            }
        }

        Ok(Self { names, lookup })
    }

    /// Build the domain of a strum-enumerable category enum.
    pub fn of<E: strum::VariantNames>() -> Result<Self, DomainError> {
        Self::new(E::VARIANTS.iter().copied())
    }

    /// Wrap the domain for sharing between flag sets.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of categories, baseline included.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a constructed domain; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, id: CategoryId) -> Option<&str> {
        self.names.get(id.0).map(String::as_str)
    }

    pub fn baseline_name(&self) -> &str {
        self.name(CategoryId::BASELINE).unwrap_or_default()
    }

    pub fn id_of(&self, name: &str) -> Option<CategoryId> {
        self.lookup.get(name).copied()
    }

    pub fn contains(&self, category: impl Category) -> bool {
        category.index() < self.names.len()
    }

    /// Iterate all category ids in index order.
    pub fn ids(&self) -> impl Iterator<Item = CategoryId> + '_ {
        (0..self.names.len()).map(CategoryId)
    }

    /// Returns true if `names` lists exactly this domain's names in order.
    pub fn has_names(&self, names: &[String]) -> bool {
        self.names.as_slice() == names
    }
}

impl PartialEq for CategoryDomain {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl Eq for CategoryDomain {}

/// Returns true if both handles describe the same domain.
pub(crate) fn same_domain(a: &Arc<CategoryDomain>, b: &Arc<CategoryDomain>) -> bool {
    Arc::ptr_eq(a, b) || **a == **b
}
