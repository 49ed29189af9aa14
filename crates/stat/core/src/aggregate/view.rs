use crate::category::CategoryFlagSet;
use crate::modifier::{ModifierId, ModifierKind, SourceId};
use crate::registry::Registry;

use super::{Aggregate, AggregateId, Totals};

/// Read-only view of a registered aggregate.
///
/// Own totals are O(1) reads; values that include children walk the child
/// list once per level.
#[derive(Clone, Copy, Debug)]
pub struct AggregateView<'a> {
    registry: &'a Registry,
    id: AggregateId,
    aggregate: &'a Aggregate,
}

impl<'a> AggregateView<'a> {
    pub(crate) fn new(registry: &'a Registry, id: AggregateId, aggregate: &'a Aggregate) -> Self {
        Self {
            registry,
            id,
            aggregate,
        }
    }

    pub fn id(&self) -> AggregateId {
        self.id
    }

    pub fn signature(&self) -> &'a str {
        self.aggregate.signature()
    }

    pub fn required(&self) -> Option<&'a CategoryFlagSet> {
        self.aggregate.required()
    }

    pub fn children(&self) -> &'a [AggregateId] {
        self.aggregate.children()
    }

    /// The underlying running state, children excluded.
    pub fn aggregate(&self) -> &'a Aggregate {
        self.aggregate
    }

    /// Totals with every child folded in.
    pub fn totals(&self) -> Totals {
        self.registry.folded_totals(self.aggregate)
    }

    pub fn flat_value(&self) -> f64 {
        self.totals().flat
    }

    pub fn percent_value(&self) -> f64 {
        self.totals().percent
    }

    pub fn multiplicative_value(&self) -> f64 {
        self.totals().multiplicative
    }

    /// `flat × percent × multiplicative`, children included.
    pub fn value(&self) -> f64 {
        self.totals().value()
    }

    /// Per-modifier contributions, for debugging and tooling.
    pub fn breakdown(&self) -> AggregateBreakdown {
        let contributions = self
            .aggregate
            .applied()
            .filter_map(|id| {
                self.registry.modifier(id).map(|modifier| Contribution {
                    modifier: id,
                    source: modifier.source(),
                    kind: modifier.kind(),
                    magnitude: modifier.magnitude(),
                })
            })
            .collect();

        let children = self
            .children()
            .iter()
            .filter_map(|&child| self.registry.aggregate(child))
            .map(|child| (child.id(), child.signature().to_owned(), child.value()))
            .collect();

        AggregateBreakdown {
            signature: self.signature().to_owned(),
            own: self.aggregate.own_totals(),
            totals: self.totals(),
            contributions,
            children,
        }
    }
}

/// One counted modifier inside an [`AggregateBreakdown`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contribution {
    pub modifier: ModifierId,
    pub source: SourceId,
    pub kind: ModifierKind,
    pub magnitude: f64,
}

/// Snapshot of how an aggregate's value was assembled.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateBreakdown {
    pub signature: String,
    /// Totals from the aggregate's own modifiers.
    pub own: Totals,
    /// Totals with children folded in.
    pub totals: Totals,
    pub contributions: Vec<Contribution>,
    /// `(id, signature, value)` for each direct child.
    pub children: Vec<(AggregateId, String, f64)>,
}

impl AggregateBreakdown {
    pub fn value(&self) -> f64 {
        self.totals.value()
    }

    /// Contributions of a single kind.
    pub fn of_kind(&self, kind: ModifierKind) -> impl Iterator<Item = &Contribution> {
        self.contributions
            .iter()
            .filter(move |contribution| contribution.kind == kind)
    }
}
