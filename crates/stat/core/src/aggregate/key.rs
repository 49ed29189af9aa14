use crate::category::CategoryFlagSet;

use super::AggregateId;

/// Describes an aggregate by its required flags and child aggregates.
///
/// Keys are compared through their canonical signature, so neither the order
/// categories were set in nor the order children were listed in matters.
///
/// # Example
/// ```
/// # use stat_core::*;
/// let domain = CategoryDomain::new(["Baseline", "Fire"]).unwrap().shared();
/// let fire = CategoryFlagSet::from_names(domain, ["Fire"]).unwrap();
///
/// let key = AggregateKey::with_flags(fire);
/// assert!(key.has_required());
/// assert!(key.child_ids().is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct AggregateKey {
    required: Option<CategoryFlagSet>,
    children: Vec<AggregateId>,
}

impl AggregateKey {
    /// An empty key; add flags and/or children before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// A key that requires `flags`.
    pub fn with_flags(flags: CategoryFlagSet) -> Self {
        Self::new().flags(flags)
    }

    /// A key that composes `children`.
    pub fn with_children(children: impl IntoIterator<Item = AggregateId>) -> Self {
        Self::new().children(children)
    }

    /// Set the required flags (builder pattern).
    pub fn flags(mut self, flags: CategoryFlagSet) -> Self {
        self.required = Some(flags);
        self
    }

    /// Add one child (builder pattern).
    pub fn child(mut self, child: AggregateId) -> Self {
        self.children.push(child);
        self
    }

    /// Add several children (builder pattern).
    pub fn children(mut self, children: impl IntoIterator<Item = AggregateId>) -> Self {
        self.children.extend(children);
        self
    }

    /// Required flags, if any category is active in them.
    pub fn required_flags(&self) -> Option<&CategoryFlagSet> {
        self.required.as_ref().filter(|flags| !flags.is_empty())
    }

    pub fn has_required(&self) -> bool {
        self.required_flags().is_some()
    }

    pub fn child_ids(&self) -> &[AggregateId] {
        &self.children
    }
}
