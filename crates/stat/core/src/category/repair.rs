//! Persisted flag layout and schema-drift repair.
//!
//! A flag set is persisted as a bit string plus the category names that were
//! current at save time. When the live domain no longer lists the same names,
//! bits are migrated **by name**. Names that have disappeared are kept as
//! pending rather than dropped, and every later repair pass tries to resolve
//! them again, so a category that is removed and later reintroduced keeps its
//! state.
//!
//! ```text
//! saved   [Baseline, A, B, C]   bits 0101   (A, C active)
//! live    [Baseline, B, C, D]
//! result  bits 0010 (C active), pending = ["A"]
//!
//! live    [Baseline, B, A, C, D]   (A reintroduced)
//! result  bits 00110 (A, C active), pending = []
//! ```

use std::sync::Arc;

use super::bits::BitVector;
use super::flags::{CategoryFlagSet, FlagError};
use super::{CategoryDomain, CategoryId};

/// Serialized form of a [`CategoryFlagSet`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersistedFlags {
    /// One `'1'` or `'0'` per entry of `names`.
    pub bits: String,

    /// Category names in domain order at save time.
    pub names: Vec<String>,

    /// Names active at some earlier save that no domain since has resolved.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub pending: Vec<String>,
}

impl PersistedFlags {
    /// Parse `bits` against the stored name list.
    ///
    /// Fails with [`FlagError::CorruptBits`] when the lengths differ and with
    /// [`FlagError::InvalidBit`] on any character other than `'0'` or `'1'`.
    pub fn decode(&self) -> Result<BitVector, FlagError> {
        decode_bits(&self.bits, self.names.len())
    }
}

/// Where a persisted category name lands in the live domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryBinding {
    /// The name exists in the live domain at this index.
    Resolved(CategoryId),
    /// The name is absent from the live domain and is carried forward.
    Pending(String),
}

impl CategoryBinding {
    pub fn bind(domain: &CategoryDomain, name: &str) -> Self {
        match domain.id_of(name) {
            Some(id) => Self::Resolved(id),
            None => Self::Pending(name.to_owned()),
        }
    }
}

/// Outcome of one repair pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// The stored name list differed from the live domain.
    pub domain_changed: bool,

    /// Previously pending names that the live domain now contains.
    pub resolved: Vec<String>,

    /// Active names missing from the live domain, pending for the first time.
    pub newly_pending: Vec<String>,
}

impl RepairReport {
    /// Returns true if the pass neither resolved nor deferred any name.
    pub fn is_clean(&self) -> bool {
        self.resolved.is_empty() && self.newly_pending.is_empty()
    }
}

impl CategoryFlagSet {
    /// Snapshot this set in its persisted layout.
    pub fn to_persisted(&self) -> PersistedFlags {
        PersistedFlags {
            bits: self.bits.to_bit_string(),
            names: self.domain.names().to_vec(),
            pending: self.pending.clone(),
        }
    }

    /// Rebuild a set from its persisted layout against the live `domain`.
    ///
    /// A bit string whose length differs from the stored name list is corrupt
    /// and rejected. A stored name list that differs from the live domain is
    /// schema drift and is repaired by name.
    pub fn restore(
        persisted: &PersistedFlags,
        domain: Arc<CategoryDomain>,
    ) -> Result<(Self, RepairReport), FlagError> {
        let old_bits = persisted.decode()?;
        let (bits, pending, report) = migrate(
            &old_bits,
            &persisted.names,
            persisted.pending.iter().cloned(),
            &domain,
        );

        Ok((
            Self {
                domain,
                bits,
                pending,
            },
            report,
        ))
    }

    /// Move this set onto a new revision of its domain, matching categories by name.
    ///
    /// Also retries every pending name, so calling this with an unchanged
    /// domain is a cheap way to pick up names that have since been reintroduced.
    pub fn repair(&mut self, domain: Arc<CategoryDomain>) -> RepairReport {
        let pending = std::mem::take(&mut self.pending);
        let (bits, pending, report) =
            migrate(&self.bits, self.domain.names(), pending.into_iter(), &domain);

        self.domain = domain;
        self.bits = bits;
        self.pending = pending;
        report
    }

    /// Resolve each active and pending name against the live domain.
    pub fn bindings(&self) -> Vec<CategoryBinding> {
        self.active_categories()
            .into_iter()
            .map(CategoryBinding::Resolved)
            .chain(self.pending.iter().cloned().map(CategoryBinding::Pending))
            .collect()
    }
}

fn decode_bits(bits: &str, expected: usize) -> Result<BitVector, FlagError> {
    let len = bits.chars().count();
    if len != expected {
        return Err(FlagError::CorruptBits {
            bits: len,
            names: expected,
        });
    }

    let mut decoded = BitVector::new(len);
    for (position, found) in bits.chars().enumerate() {
        match found {
            '1' => {
                decoded.set(position, true);
            }
            '0' => {}
            _ => return Err(FlagError::InvalidBit { position, found }),
        }
    }
    Ok(decoded)
}

fn migrate(
    old_bits: &BitVector,
    old_names: &[String],
    pending: impl Iterator<Item = String>,
    domain: &CategoryDomain,
) -> (BitVector, Vec<String>, RepairReport) {
    let mut report = RepairReport {
        domain_changed: !domain.has_names(old_names),
        ..RepairReport::default()
    };
    let mut bits = BitVector::new(domain.len());
    let mut still_pending: Vec<String> = Vec::new();

    for name in pending {
        match CategoryBinding::bind(domain, &name) {
            CategoryBinding::Resolved(id) => {
                bits.set(id.0, true);
                report.resolved.push(name);
            }
            CategoryBinding::Pending(name) => {
                if !still_pending.contains(&name) {
                    still_pending.push(name);
                }
            }
        }
    }

    for index in old_bits.iter_ones() {
        let Some(name) = old_names.get(index) else {
            continue;
        };
        match CategoryBinding::bind(domain, name) {
            CategoryBinding::Resolved(id) => {
                bits.set(id.0, true);
            }
            CategoryBinding::Pending(name) => {
                if !still_pending.contains(&name) {
                    report.newly_pending.push(name.clone());
                    still_pending.push(name);
                }
            }
        }
    }

    if !report.resolved.is_empty() {
        tracing::debug!(
            target: "stat_core::category",
            names = ?report.resolved,
            "resolved pending categories"
        );
    }
    if !report.newly_pending.is_empty() {
        tracing::warn!(
            target: "stat_core::category",
            names = ?report.newly_pending,
            "categories missing from live domain, keeping them pending"
        );
    }

    (bits, still_pending, report)
}
