//! Aggregates - incrementally maintained stat values.
//!
//! An aggregate keeps three running totals that the [`Registry`](crate::Registry)
//! updates as modifiers come and go:
//!
//! ```text
//! flat            Σ Flat magnitudes              (starts at 0)
//! percent         1 + Σ Percent magnitudes       (starts at 1)
//! multiplicative  Π Multiplicative magnitudes    (starts at 1)
//! ```
//!
//! Child aggregates are folded in when the value is read, never cached.

mod key;
mod signature;
mod view;

pub use key::AggregateKey;
pub use signature::canonical_signature;
pub use view::{AggregateBreakdown, AggregateView, Contribution};

use std::collections::{BTreeMap, BTreeSet};

use crate::category::CategoryFlagSet;
use crate::modifier::{Modifier, ModifierId, ModifierKind};

/// Handle to an aggregate held by a [`Registry`](crate::Registry).
///
/// Ids are allocated in increasing order and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AggregateId(pub(crate) u64);

impl AggregateId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "agg{}", self.0)
    }
}

/// The three layers of an aggregate value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Totals {
    pub flat: f64,
    pub percent: f64,
    pub multiplicative: f64,
}

impl Totals {
    /// Totals of an aggregate with no contributions.
    pub const IDENTITY: Self = Self {
        flat: 0.0,
        percent: 1.0,
        multiplicative: 1.0,
    };

    /// `flat × percent × multiplicative`
    pub fn value(&self) -> f64 {
        self.flat * self.percent * self.multiplicative
    }

    /// Fold a child's totals into these.
    pub fn absorb(&mut self, child: Totals) {
        self.flat += child.flat;
        self.percent += child.percent - 1.0;
        self.multiplicative *= child.multiplicative;
    }
}

impl Default for Totals {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Live running state of one aggregate.
///
/// The set of applied modifier ids records which pairings matched when the
/// modifier was added. Removal consults that set instead of re-testing flags,
/// so the totals cannot drift from the modifiers actually counted.
#[derive(Clone, Debug)]
pub struct Aggregate {
    signature: String,
    required: Option<CategoryFlagSet>,
    children: Vec<AggregateId>,
    flat: f64,
    percent: f64,
    product: f64,
    /// Multiplicative ×0 modifiers are counted rather than multiplied in, so
    /// that removing one restores the product.
    zero_factors: usize,
    applied: BTreeSet<ModifierId>,
}

impl Aggregate {
    pub(crate) fn new(
        signature: String,
        required: Option<CategoryFlagSet>,
        children: Vec<AggregateId>,
    ) -> Self {
        Self {
            signature,
            required,
            children,
            flat: Totals::IDENTITY.flat,
            percent: Totals::IDENTITY.percent,
            product: Totals::IDENTITY.multiplicative,
            zero_factors: 0,
            applied: BTreeSet::new(),
        }
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn required(&self) -> Option<&CategoryFlagSet> {
        self.required.as_ref()
    }

    pub fn children(&self) -> &[AggregateId] {
        &self.children
    }

    /// Returns true if the modifier is currently counted in this aggregate.
    pub fn is_applied(&self, id: ModifierId) -> bool {
        self.applied.contains(&id)
    }

    /// Ids of the counted modifiers, in insertion order.
    pub fn applied(&self) -> impl Iterator<Item = ModifierId> + '_ {
        self.applied.iter().copied()
    }

    pub fn own_flat(&self) -> f64 {
        self.flat
    }

    pub fn own_percent(&self) -> f64 {
        self.percent
    }

    pub fn own_multiplicative(&self) -> f64 {
        if self.zero_factors > 0 {
            0.0
        } else {
            self.product
        }
    }

    /// Totals from this aggregate's own modifiers, children excluded.
    pub fn own_totals(&self) -> Totals {
        Totals {
            flat: self.own_flat(),
            percent: self.own_percent(),
            multiplicative: self.own_multiplicative(),
        }
    }

    /// Returns true if a modifier with these flags would be counted here.
    pub fn accepts(&self, modifier: &Modifier) -> bool {
        self.required
            .as_ref()
            .is_some_and(|required| modifier.matches(required))
    }

    /// Count the modifier if its flags satisfy the requirements.
    ///
    /// Returns true if the totals changed.
    pub(crate) fn on_modifier_added(&mut self, id: ModifierId, modifier: &Modifier) -> bool {
        if !self.accepts(modifier) || !self.applied.insert(id) {
            return false;
        }

        let magnitude = modifier.magnitude();
        match modifier.kind() {
            ModifierKind::Flat => self.flat += magnitude,
            ModifierKind::Percent => self.percent += magnitude,
            ModifierKind::Multiplicative if magnitude == 0.0 => self.zero_factors += 1,
            ModifierKind::Multiplicative => self.product *= magnitude,
        }
        true
    }

    /// Reverse a previous [`on_modifier_added`](Self::on_modifier_added).
    ///
    /// Modifiers that were not counted are ignored. `live` holds the modifiers
    /// still in the pool, the removed one excluded. Once a running total has
    /// overflowed or a product has underflowed, subtracting or dividing can no
    /// longer restore it, so the totals are rebuilt from `live` instead.
    ///
    /// Returns true if the totals changed.
    pub(crate) fn on_modifier_removed(
        &mut self,
        id: ModifierId,
        modifier: &Modifier,
        live: &BTreeMap<ModifierId, Modifier>,
    ) -> bool {
        if !self.applied.remove(&id) {
            return false;
        }

        if !self.is_invertible() {
            self.rebuild(live);
            return true;
        }

        let magnitude = modifier.magnitude();
        match modifier.kind() {
            ModifierKind::Flat => self.flat -= magnitude,
            ModifierKind::Percent => self.percent -= magnitude,
            ModifierKind::Multiplicative if magnitude == 0.0 => {
                self.zero_factors = self.zero_factors.saturating_sub(1);
            }
            ModifierKind::Multiplicative => self.product /= magnitude,
        }
        true
    }

    /// Returns true while every running total can be reversed exactly by
    /// subtraction or division.
    fn is_invertible(&self) -> bool {
        self.flat.is_finite() && self.percent.is_finite() && self.product.is_normal()
    }

    /// Recompute the totals from the applied set.
    fn rebuild(&mut self, live: &BTreeMap<ModifierId, Modifier>) {
        let applied = std::mem::take(&mut self.applied);
        self.reset();

        for id in applied {
            match live.get(&id) {
                Some(modifier) => {
                    self.on_modifier_added(id, modifier);
                }
                None => tracing::warn!(
                    target: "stat_core::aggregate",
                    signature = %self.signature,
                    modifier = %id,
                    "applied modifier missing from pool during rebuild"
                ),
            }
        }

        tracing::debug!(
            target: "stat_core::aggregate",
            signature = %self.signature,
            applied = self.applied.len(),
            "rebuilt aggregate totals"
        );
    }

    /// Drop every counted modifier.
    pub(crate) fn reset(&mut self) {
        self.flat = Totals::IDENTITY.flat;
        self.percent = Totals::IDENTITY.percent;
        self.product = Totals::IDENTITY.multiplicative;
        self.zero_factors = 0;
        self.applied.clear();
    }
}
