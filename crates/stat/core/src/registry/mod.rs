//! Modifier pool and aggregate catalogue.
//!
//! The registry is the only writer of aggregate state. Every modifier change
//! is pushed synchronously, in aggregate insertion order, through direct calls
//! to each aggregate; there is no queue and nothing is deferred.

mod error;

pub use error::RegistryError;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::aggregate::{
    Aggregate, AggregateBreakdown, AggregateId, AggregateKey, AggregateView, Totals,
    canonical_signature,
};
use crate::category::{CategoryDomain, CategoryFlagSet, same_domain};
use crate::config::RegistryConfig;
use crate::modifier::{Modifier, ModifierId, SourceId};

/// Owns the live modifiers of one stat block and the aggregates derived from them.
///
/// # Example
/// ```
/// # use stat_core::*;
/// let domain = CategoryDomain::new(["Baseline", "Fire"]).unwrap().shared();
/// let fire = domain.id_of("Fire").unwrap();
/// let mut registry = Registry::new(domain.clone());
///
/// registry.add_modifier(Modifier::flat(&domain, 10.0, SourceId(1), [fire]).unwrap()).unwrap();
/// registry.add_modifier(Modifier::percent(&domain, 0.5, SourceId(1), [fire]).unwrap()).unwrap();
///
/// let key = AggregateKey::with_flags(CategoryFlagSet::with(domain, [fire]).unwrap());
/// let damage = registry.add_aggregate(&key).unwrap();
/// assert_eq!(registry.value(damage).unwrap(), 15.0);
/// ```
#[derive(Debug)]
pub struct Registry {
    domain: Arc<CategoryDomain>,
    config: RegistryConfig,
    modifiers: BTreeMap<ModifierId, Modifier>,
    aggregates: BTreeMap<AggregateId, Aggregate>,
    signatures: HashMap<String, AggregateId>,
    next_modifier: u64,
    next_aggregate: u64,
}

impl Registry {
    /// Create an empty registry over `domain` with the default configuration.
    pub fn new(domain: Arc<CategoryDomain>) -> Self {
        Self::with_config(domain, RegistryConfig::default())
    }

    pub fn with_config(domain: Arc<CategoryDomain>, config: RegistryConfig) -> Self {
        Self {
            domain,
            config,
            modifiers: BTreeMap::new(),
            aggregates: BTreeMap::new(),
            signatures: HashMap::new(),
            next_modifier: 0,
            next_aggregate: 0,
        }
    }

    pub fn domain(&self) -> &Arc<CategoryDomain> {
        &self.domain
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ========================================================================
    // Modifiers
    // ========================================================================

    /// Add a modifier and notify every aggregate.
    pub fn add_modifier(&mut self, modifier: Modifier) -> Result<ModifierId, RegistryError> {
        self.check_domain(modifier.flags())?;
        Ok(self.insert_modifier(modifier))
    }

    /// Add several modifiers.
    ///
    /// All modifiers are checked before any is added, so a domain mismatch
    /// leaves the registry untouched.
    pub fn add_modifiers(
        &mut self,
        modifiers: impl IntoIterator<Item = Modifier>,
    ) -> Result<Vec<ModifierId>, RegistryError> {
        let modifiers: Vec<Modifier> = modifiers.into_iter().collect();
        for modifier in &modifiers {
            self.check_domain(modifier.flags())?;
        }
        Ok(modifiers
            .into_iter()
            .map(|modifier| self.insert_modifier(modifier))
            .collect())
    }

    /// Remove a modifier and notify every aggregate.
    ///
    /// Returns false if the modifier is not live.
    pub fn remove_modifier(&mut self, id: ModifierId) -> bool {
        let Some(modifier) = self.modifiers.remove(&id) else {
            return false;
        };

        let live = &self.modifiers;
        let touched = self
            .aggregates
            .values_mut()
            .filter_map(|aggregate| {
                aggregate
                    .on_modifier_removed(id, &modifier, live)
                    .then_some(())
            })
            .count();

        trace!(
            target: "stat_core::registry",
            modifier = %id,
            source = %modifier.source(),
            aggregates = touched,
            "removed modifier"
        );
        true
    }

    /// Remove several modifiers. Returns true only if every one was live.
    pub fn remove_modifiers(&mut self, ids: impl IntoIterator<Item = ModifierId>) -> bool {
        ids.into_iter()
            .fold(true, |all, id| self.remove_modifier(id) && all)
    }

    /// Remove every modifier granted by `source`. Returns true if any was removed.
    pub fn remove_all_by_source(&mut self, source: SourceId) -> bool {
        let ids = self.collect_modifiers(|modifier| modifier.source() == source);
        let removed = !ids.is_empty();
        self.remove_modifiers(ids);
        debug!(
            target: "stat_core::registry",
            source = %source,
            removed,
            "removed modifiers by source"
        );
        removed
    }

    /// Remove every modifier that lacks the baseline category.
    ///
    /// Returns the number of modifiers removed.
    pub fn remove_all_non_baseline(&mut self) -> usize {
        let ids = self.collect_modifiers(|modifier| !modifier.is_baseline());
        let count = ids.len();
        self.remove_modifiers(ids);
        debug!(
            target: "stat_core::registry",
            removed = count,
            "removed non-baseline modifiers"
        );
        count
    }

    /// Remove every modifier and reset every aggregate to its empty totals.
    pub fn remove_all(&mut self) {
        let count = self.modifiers.len();
        self.modifiers.clear();
        self.aggregates.values_mut().for_each(Aggregate::reset);
        debug!(
            target: "stat_core::registry",
            removed = count,
            "removed all modifiers"
        );
    }

    pub fn modifier(&self, id: ModifierId) -> Option<&Modifier> {
        self.modifiers.get(&id)
    }

    /// Live modifiers in insertion order.
    pub fn modifiers(&self) -> impl Iterator<Item = (ModifierId, &Modifier)> {
        self.modifiers.iter().map(|(&id, modifier)| (id, modifier))
    }

    pub fn modifier_count(&self) -> usize {
        self.modifiers.len()
    }

    // ========================================================================
    // Aggregates
    // ========================================================================

    /// Register an aggregate and back-fill it from every live modifier.
    pub fn add_aggregate(&mut self, key: &AggregateKey) -> Result<AggregateId, RegistryError> {
        self.validate_key(key)?;

        let signature = self.signature_of(key)?;
        if self.signatures.contains_key(&signature) {
            return Err(RegistryError::AlreadyExists { signature });
        }

        let id = AggregateId(self.next_aggregate);
        self.next_aggregate += 1;

        let mut aggregate = Aggregate::new(
            signature.clone(),
            key.required_flags().cloned(),
            key.child_ids().to_vec(),
        );
        for (&modifier_id, modifier) in &self.modifiers {
            aggregate.on_modifier_added(modifier_id, modifier);
        }

        debug!(
            target: "stat_core::registry",
            aggregate = %id,
            signature = %signature,
            backfilled = aggregate.applied().count(),
            children = aggregate.children().len(),
            "added aggregate"
        );

        self.signatures.insert(signature, id);
        self.aggregates.insert(id, aggregate);
        Ok(id)
    }

    /// Unregister the aggregate described by `key`.
    ///
    /// Returns false if no such aggregate exists. Fails if another aggregate
    /// still lists it as a child.
    pub fn remove_aggregate(&mut self, key: &AggregateKey) -> Result<bool, RegistryError> {
        let signature = match self.signature_of(key) {
            Ok(signature) => signature,
            // A key naming an unregistered child cannot describe a live aggregate.
            Err(RegistryError::UnknownChild(_)) => return Ok(false),
            Err(err) => return Err(err),
        };
        let Some(&id) = self.signatures.get(&signature) else {
            return Ok(false);
        };

        if let Some(parent) = self
            .aggregates
            .values()
            .find(|aggregate| aggregate.children().contains(&id))
        {
            return Err(RegistryError::AggregateInUse {
                signature,
                parent: parent.signature().to_owned(),
            });
        }

        self.signatures.remove(&signature);
        if self.aggregates.remove(&id).is_none() {
            return Err(RegistryError::Desynchronized { signature });
        }

        debug!(
            target: "stat_core::registry",
            aggregate = %id,
            signature = %signature,
            "removed aggregate"
        );
        Ok(true)
    }

    /// Look up the aggregate described by `key`.
    pub fn get_aggregate(&self, key: &AggregateKey) -> Result<AggregateId, RegistryError> {
        let signature = self.signature_of(key)?;
        self.signatures
            .get(&signature)
            .copied()
            .ok_or(RegistryError::NotFound { signature })
    }

    /// Look up an aggregate by its canonical signature.
    pub fn aggregate_by_signature(&self, signature: &str) -> Option<AggregateId> {
        self.signatures.get(signature).copied()
    }

    pub fn aggregate(&self, id: AggregateId) -> Option<AggregateView<'_>> {
        self.aggregates
            .get(&id)
            .map(|aggregate| AggregateView::new(self, id, aggregate))
    }

    /// Registered aggregates in insertion order.
    pub fn aggregates(&self) -> impl Iterator<Item = AggregateView<'_>> {
        self.aggregates
            .iter()
            .map(|(&id, aggregate)| AggregateView::new(self, id, aggregate))
    }

    pub fn aggregate_count(&self) -> usize {
        self.aggregates.len()
    }

    /// `flat × percent × multiplicative` of an aggregate, children included.
    pub fn value(&self, id: AggregateId) -> Result<f64, RegistryError> {
        self.view(id).map(|view| view.value())
    }

    pub fn flat_value(&self, id: AggregateId) -> Result<f64, RegistryError> {
        self.view(id).map(|view| view.flat_value())
    }

    pub fn percent_value(&self, id: AggregateId) -> Result<f64, RegistryError> {
        self.view(id).map(|view| view.percent_value())
    }

    pub fn multiplicative_value(&self, id: AggregateId) -> Result<f64, RegistryError> {
        self.view(id).map(|view| view.multiplicative_value())
    }

    pub fn breakdown(&self, id: AggregateId) -> Result<AggregateBreakdown, RegistryError> {
        self.view(id).map(|view| view.breakdown())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Totals of `aggregate` with every descendant folded in.
    ///
    /// Children are always registered before their parents and cannot be
    /// removed while referenced, so the child graph is acyclic and the walk
    /// terminates. Descendants are visited from an explicit stack so chain
    /// depth is not bounded by the call stack. A child reachable along two
    /// paths is folded once per path.
    pub(crate) fn folded_totals(&self, aggregate: &Aggregate) -> Totals {
        let mut totals = aggregate.own_totals();
        let mut pending: Vec<AggregateId> = aggregate.children().to_vec();

        while let Some(child) = pending.pop() {
            let Some(child) = self.aggregates.get(&child) else {
                continue;
            };
            totals.absorb(child.own_totals());
            pending.extend_from_slice(child.children());
        }
        totals
    }

    fn view(&self, id: AggregateId) -> Result<AggregateView<'_>, RegistryError> {
        self.aggregate(id)
            .ok_or(RegistryError::UnknownAggregate(id))
    }

    fn insert_modifier(&mut self, modifier: Modifier) -> ModifierId {
        let id = ModifierId(self.next_modifier);
        self.next_modifier += 1;

        let touched = self
            .aggregates
            .values_mut()
            .filter_map(|aggregate| aggregate.on_modifier_added(id, &modifier).then_some(()))
            .count();

        trace!(
            target: "stat_core::registry",
            modifier = %id,
            source = %modifier.source(),
            kind = %modifier.kind(),
            magnitude = modifier.magnitude(),
            aggregates = touched,
            "added modifier"
        );

        self.modifiers.insert(id, modifier);
        id
    }

    fn collect_modifiers(&self, predicate: impl Fn(&Modifier) -> bool) -> Vec<ModifierId> {
        self.modifiers
            .iter()
            .filter(|(_, modifier)| predicate(modifier))
            .map(|(&id, _)| id)
            .collect()
    }

    fn check_domain(&self, flags: &CategoryFlagSet) -> Result<(), RegistryError> {
        if same_domain(flags.domain(), &self.domain) {
            Ok(())
        } else {
            Err(RegistryError::DomainMismatch)
        }
    }

    fn validate_key(&self, key: &AggregateKey) -> Result<(), RegistryError> {
        let children = key.child_ids();

        match key.required_flags() {
            Some(required) => self.check_domain(required)?,
            None if children.is_empty() => return Err(RegistryError::EmptyAggregate),
            None if children.len() < self.config.min_children_without_flags => {
                return Err(RegistryError::TooFewChildren {
                    min: self.config.min_children_without_flags,
                    got: children.len(),
                });
            }
            None => {}
        }

        let mut seen = HashSet::with_capacity(children.len());
        for &child in children {
            if !self.aggregates.contains_key(&child) {
                return Err(RegistryError::UnknownChild(child));
            }
            if !seen.insert(child) {
                return Err(RegistryError::DuplicateChild(child));
            }
        }
        Ok(())
    }

    fn signature_of(&self, key: &AggregateKey) -> Result<String, RegistryError> {
        let child_signatures = key
            .child_ids()
            .iter()
            .map(|&child| {
                self.aggregates
                    .get(&child)
                    .map(Aggregate::signature)
                    .ok_or(RegistryError::UnknownChild(child))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(canonical_signature(key.required_flags(), child_signatures))
    }
}
