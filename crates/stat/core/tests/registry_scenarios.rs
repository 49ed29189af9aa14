use std::sync::Arc;

use stat_core::{
    AggregateKey, Category, CategoryDomain, CategoryFlagSet, DomainError, ErrorKind, Modifier,
    ModifierKind, Registry, RegistryConfig, RegistryError, SourceId, StatError,
};

#[derive(Clone, Copy, Debug, strum::VariantNames)]
enum Tag {
    Baseline,
    Physical,
    Fire,
    Cold,
    Melee,
    Spell,
}

impl Category for Tag {
    fn index(self) -> usize {
        self as usize
    }
}

const WEAPON: SourceId = SourceId(1);
const RING: SourceId = SourceId(2);
const AURA: SourceId = SourceId(3);

fn domain() -> Arc<CategoryDomain> {
    CategoryDomain::of::<Tag>()
        .expect("tag enum should form a valid domain")
        .shared()
}

fn requiring(domain: &Arc<CategoryDomain>, tags: &[Tag]) -> AggregateKey {
    let flags = CategoryFlagSet::with(Arc::clone(domain), tags.iter().copied())
        .expect("tags belong to the domain");
    AggregateKey::with_flags(flags)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Fire damage from a weapon and a ring, then the weapon is unequipped.
#[test]
fn fire_damage_follows_equipment_changes() {
    let domain = domain();
    let mut registry = Registry::new(Arc::clone(&domain));

    // ================================================================
    // Equip
    // ================================================================
    registry
        .add_modifiers([
            Modifier::flat(&domain, 10.0, WEAPON, [Tag::Fire]).expect("flat"),
            Modifier::percent(&domain, 0.5, WEAPON, [Tag::Fire]).expect("percent"),
            Modifier::multiplicative(&domain, 1.2, RING, [Tag::Fire]).expect("mult"),
        ])
        .expect("modifiers share the registry domain");

    let fire = registry
        .add_aggregate(&requiring(&domain, &[Tag::Fire]))
        .expect("fire aggregate should register");

    assert_close(registry.flat_value(fire).unwrap(), 10.0);
    assert_close(registry.percent_value(fire).unwrap(), 1.5);
    assert_close(registry.multiplicative_value(fire).unwrap(), 1.2);
    assert_close(registry.value(fire).unwrap(), 18.0);

    // ================================================================
    // Unequip the weapon
    // ================================================================
    assert!(registry.remove_all_by_source(WEAPON));

    assert_close(registry.flat_value(fire).unwrap(), 0.0);
    assert_close(registry.percent_value(fire).unwrap(), 1.0);
    assert_close(registry.multiplicative_value(fire).unwrap(), 1.2);
    assert_close(registry.value(fire).unwrap(), 0.0);
    assert!(!registry.remove_all_by_source(WEAPON));
}

#[test]
fn only_matching_modifiers_are_counted() {
    let domain = domain();
    let mut registry = Registry::new(Arc::clone(&domain));
    let fire_melee = registry
        .add_aggregate(&requiring(&domain, &[Tag::Fire, Tag::Melee]))
        .unwrap();

    registry
        .add_modifiers([
            // Superset of the requirement: counted.
            Modifier::flat(&domain, 5.0, WEAPON, [Tag::Fire, Tag::Melee, Tag::Physical]).unwrap(),
            // Missing Melee: ignored.
            Modifier::flat(&domain, 100.0, WEAPON, [Tag::Fire]).unwrap(),
            // Disjoint: ignored.
            Modifier::percent(&domain, 3.0, RING, [Tag::Cold, Tag::Spell]).unwrap(),
            Modifier::percent(&domain, 0.25, RING, [Tag::Melee, Tag::Fire]).unwrap(),
        ])
        .unwrap();

    let view = registry.aggregate(fire_melee).expect("aggregate is registered");
    assert_close(view.flat_value(), 5.0);
    assert_close(view.percent_value(), 1.25);
    assert_close(view.value(), 6.25);
    assert_eq!(view.aggregate().applied().count(), 2);
}

#[test]
fn adding_then_removing_restores_totals() {
    let domain = domain();
    let mut registry = Registry::new(Arc::clone(&domain));
    let cold = registry
        .add_aggregate(&requiring(&domain, &[Tag::Cold]))
        .unwrap();
    registry
        .add_modifier(Modifier::flat(&domain, 4.0, WEAPON, [Tag::Cold]).unwrap())
        .unwrap();
    let before = registry.aggregate(cold).unwrap().totals();

    let ids = registry
        .add_modifiers([
            Modifier::flat(&domain, 2.5, AURA, [Tag::Cold]).unwrap(),
            Modifier::percent(&domain, -0.3, AURA, [Tag::Cold, Tag::Spell]).unwrap(),
            Modifier::multiplicative(&domain, 0.0, AURA, [Tag::Cold]).unwrap(),
            Modifier::multiplicative(&domain, 1.75, AURA, [Tag::Cold]).unwrap(),
        ])
        .unwrap();
    assert_close(registry.value(cold).unwrap(), 0.0);

    assert!(registry.remove_modifiers(ids));
    let after = registry.aggregate(cold).unwrap().totals();
    assert_close(after.flat, before.flat);
    assert_close(after.percent, before.percent);
    assert_close(after.multiplicative, before.multiplicative);
}

/// Two tiny factors underflow the product to zero; removing them must not
/// leave it stuck there.
#[test]
fn extreme_magnitudes_round_trip() {
    let domain = domain();
    let mut registry = Registry::new(Arc::clone(&domain));
    let fire = registry
        .add_aggregate(&requiring(&domain, &[Tag::Fire]))
        .unwrap();
    registry
        .add_modifier(Modifier::flat(&domain, 5.0, WEAPON, [Tag::Fire]).unwrap())
        .unwrap();

    // ================================================================
    // Underflow
    // ================================================================
    let tiny = registry
        .add_modifiers([
            Modifier::multiplicative(&domain, 1e-200, AURA, [Tag::Fire]).unwrap(),
            Modifier::multiplicative(&domain, 1e-200, AURA, [Tag::Fire]).unwrap(),
        ])
        .unwrap();
    assert_eq!(registry.multiplicative_value(fire).unwrap(), 0.0);

    assert!(registry.remove_modifiers(tiny));
    assert_close(registry.multiplicative_value(fire).unwrap(), 1.0);
    assert_close(registry.value(fire).unwrap(), 5.0);

    // ================================================================
    // Overflow
    // ================================================================
    let cold = registry
        .add_aggregate(&requiring(&domain, &[Tag::Cold]))
        .unwrap();
    let huge = registry
        .add_modifiers([
            Modifier::flat(&domain, 1e308, RING, [Tag::Cold]).unwrap(),
            Modifier::flat(&domain, 1e308, RING, [Tag::Cold]).unwrap(),
        ])
        .unwrap();
    assert_eq!(registry.flat_value(cold).unwrap(), f64::INFINITY);

    assert!(registry.remove_all_by_source(RING));
    assert_eq!(registry.flat_value(cold).unwrap(), 0.0);
    assert_close(registry.value(fire).unwrap(), 5.0);
    assert!(huge.iter().all(|&id| registry.modifier(id).is_none()));
}

#[test]
fn baseline_modifiers_reach_narrower_aggregates() {
    let domain = domain();
    let mut registry = Registry::new(Arc::clone(&domain));
    let fire = registry
        .add_aggregate(&requiring(&domain, &[Tag::Fire]))
        .unwrap();
    let fire_spell = registry
        .add_aggregate(&requiring(&domain, &[Tag::Fire, Tag::Spell]))
        .unwrap();

    // Character level bonus: baseline + Fire.
    registry
        .add_modifier(Modifier::flat(&domain, 3.0, AURA, [Tag::Baseline, Tag::Fire]).unwrap())
        .unwrap();
    registry
        .add_modifier(Modifier::flat(&domain, 1.0, WEAPON, [Tag::Fire]).unwrap())
        .unwrap();

    assert_close(registry.flat_value(fire).unwrap(), 4.0);
    assert_close(registry.flat_value(fire_spell).unwrap(), 0.0);

    assert_eq!(registry.remove_all_non_baseline(), 1);
    assert_close(registry.flat_value(fire).unwrap(), 3.0);
    assert_eq!(registry.modifier_count(), 1);
}

#[test]
fn signature_is_independent_of_order() {
    let domain = domain();
    let mut registry = Registry::new(Arc::clone(&domain));

    let first = registry
        .add_aggregate(&requiring(&domain, &[Tag::Melee, Tag::Physical]))
        .unwrap();
    let found = registry
        .get_aggregate(&requiring(&domain, &[Tag::Physical, Tag::Melee]))
        .expect("reordered key should find the same aggregate");
    assert_eq!(first, found);
    assert_eq!(
        registry.aggregate(first).unwrap().signature(),
        "Melee+Physical"
    );

    let err = registry
        .add_aggregate(&requiring(&domain, &[Tag::Physical, Tag::Melee]))
        .unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyExists { .. }));
    assert_eq!(err.kind(), ErrorKind::Lookup);
}

#[test]
fn distinct_requirements_never_share_a_signature() {
    // A name that would read as two joined names cannot enter a domain.
    let err = CategoryDomain::new(["Baseline", "A", "B", "A+B"]).unwrap_err();
    assert_eq!(
        err,
        DomainError::ReservedCharacter {
            index: 3,
            name: "A+B".into()
        }
    );
    assert_eq!(err.kind(), ErrorKind::Construction);

    let domain = CategoryDomain::new(["Baseline", "A", "B", "AB"])
        .unwrap()
        .shared();
    let mut registry = Registry::new(Arc::clone(&domain));
    let key = |names: &[&str]| {
        AggregateKey::with_flags(CategoryFlagSet::from_names(Arc::clone(&domain), names).unwrap())
    };

    let both = registry.add_aggregate(&key(&["A", "B"])).unwrap();
    let joined = registry
        .add_aggregate(&key(&["AB"]))
        .expect("a different requirement gets its own aggregate");
    assert_ne!(both, joined);
    assert_eq!(registry.get_aggregate(&key(&["AB"])).unwrap(), joined);
    assert_eq!(registry.get_aggregate(&key(&["B", "A"])).unwrap(), both);
}

#[test]
fn composite_aggregate_folds_children() {
    let domain = domain();
    let mut registry = Registry::new(Arc::clone(&domain));

    let fire = registry
        .add_aggregate(&requiring(&domain, &[Tag::Fire]))
        .unwrap();
    let cold = registry
        .add_aggregate(&requiring(&domain, &[Tag::Cold]))
        .unwrap();
    let elemental = registry
        .add_aggregate(&AggregateKey::with_children([fire, cold]))
        .expect("two children satisfy the default policy");

    // Same children in the other order describe the same aggregate.
    assert_eq!(
        registry
            .get_aggregate(&AggregateKey::new().child(cold).child(fire))
            .unwrap(),
        elemental
    );

    registry
        .add_modifiers([
            Modifier::flat(&domain, 10.0, WEAPON, [Tag::Fire]).unwrap(),
            Modifier::percent(&domain, 0.2, WEAPON, [Tag::Fire]).unwrap(),
            Modifier::flat(&domain, 6.0, RING, [Tag::Cold]).unwrap(),
            Modifier::percent(&domain, 0.3, RING, [Tag::Cold]).unwrap(),
            Modifier::multiplicative(&domain, 2.0, RING, [Tag::Cold]).unwrap(),
        ])
        .unwrap();

    // flat 16, percent 1 + 0.2 + 0.3, product 2
    let totals = registry.aggregate(elemental).unwrap().totals();
    assert_close(totals.flat, 16.0);
    assert_close(totals.percent, 1.5);
    assert_close(totals.multiplicative, 2.0);
    assert_close(registry.value(elemental).unwrap(), 48.0);

    let breakdown = registry.breakdown(elemental).unwrap();
    assert!(breakdown.contributions.is_empty());
    assert_eq!(breakdown.children.len(), 2);
    assert_close(breakdown.value(), 48.0);

    let fire_breakdown = registry.breakdown(fire).unwrap();
    assert_eq!(fire_breakdown.of_kind(ModifierKind::Flat).count(), 1);
    assert_eq!(fire_breakdown.of_kind(ModifierKind::Percent).count(), 1);
    assert_eq!(fire_breakdown.of_kind(ModifierKind::Multiplicative).count(), 0);
}

#[test]
fn composite_with_flags_counts_own_and_child_modifiers() {
    let domain = domain();
    let mut registry = Registry::new(Arc::clone(&domain));
    let spell = registry
        .add_aggregate(&requiring(&domain, &[Tag::Spell]))
        .unwrap();
    let key = requiring(&domain, &[Tag::Fire]).child(spell);

    registry
        .add_modifier(Modifier::flat(&domain, 2.0, RING, [Tag::Spell]).unwrap())
        .unwrap();
    registry
        .add_modifier(Modifier::flat(&domain, 5.0, WEAPON, [Tag::Fire]).unwrap())
        .unwrap();

    // A single child is fine when required flags are present.
    let fire_spell = registry.add_aggregate(&key).unwrap();
    assert_eq!(
        registry.aggregate(fire_spell).unwrap().signature(),
        "Fire(Spell)"
    );
    assert_close(registry.flat_value(fire_spell).unwrap(), 7.0);
}

#[test]
fn min_children_policy_is_enforced() {
    let domain = domain();
    let mut registry = Registry::with_config(
        Arc::clone(&domain),
        RegistryConfig::with_min_children_without_flags(3),
    );
    let fire = registry
        .add_aggregate(&requiring(&domain, &[Tag::Fire]))
        .unwrap();
    let cold = registry
        .add_aggregate(&requiring(&domain, &[Tag::Cold]))
        .unwrap();

    let err = registry
        .add_aggregate(&AggregateKey::with_children([fire, cold]))
        .unwrap_err();
    assert_eq!(err, RegistryError::TooFewChildren { min: 3, got: 2 });
    assert_eq!(err.kind(), ErrorKind::Construction);
}

#[test]
fn deep_child_chains_fold_every_level() {
    const DEPTH: usize = 2_000;

    let domain = domain();
    let mut registry = Registry::with_config(
        Arc::clone(&domain),
        RegistryConfig::with_min_children_without_flags(1),
    );
    registry
        .add_modifiers([
            Modifier::flat(&domain, 3.0, WEAPON, [Tag::Fire]).unwrap(),
            Modifier::percent(&domain, 0.5, WEAPON, [Tag::Fire]).unwrap(),
            Modifier::flat(&domain, 1.0, RING, [Tag::Cold]).unwrap(),
        ])
        .unwrap();

    let mut top = registry
        .add_aggregate(&requiring(&domain, &[Tag::Fire]))
        .unwrap();
    for level in 1..DEPTH {
        let key = if level == DEPTH / 2 {
            requiring(&domain, &[Tag::Cold]).child(top)
        } else {
            AggregateKey::with_children([top])
        };
        top = registry
            .add_aggregate(&key)
            .expect("each level has a distinct signature");
    }

    let totals = registry.aggregate(top).unwrap().totals();
    assert_close(totals.flat, 4.0);
    assert_close(totals.percent, 1.5);
    assert_close(totals.value(), 6.0);
}

#[test]
fn aggregates_are_removed_parent_first() {
    let domain = domain();
    let mut registry = Registry::new(Arc::clone(&domain));
    let fire_key = requiring(&domain, &[Tag::Fire]);
    let cold_key = requiring(&domain, &[Tag::Cold]);
    let fire = registry.add_aggregate(&fire_key).unwrap();
    let cold = registry.add_aggregate(&cold_key).unwrap();
    let elemental_key = AggregateKey::with_children([fire, cold]);
    registry.add_aggregate(&elemental_key).unwrap();

    let err = registry.remove_aggregate(&cold_key).unwrap_err();
    assert_eq!(err.error_code(), "AGGREGATE_IN_USE");

    assert!(registry.remove_aggregate(&elemental_key).unwrap());
    assert!(registry.remove_aggregate(&cold_key).unwrap());
    assert!(!registry.remove_aggregate(&cold_key).unwrap());
    assert!(registry.aggregate(cold).is_none());

    let remaining: Vec<_> = registry.aggregates().map(|view| view.id()).collect();
    assert_eq!(remaining, vec![fire]);

    // A removed id is never handed out again.
    let cold_again = registry.add_aggregate(&cold_key).unwrap();
    assert_ne!(cold_again, cold);
}

#[test]
fn remove_all_clears_every_aggregate() {
    let domain = domain();
    let mut registry = Registry::new(Arc::clone(&domain));
    let physical = registry
        .add_aggregate(&requiring(&domain, &[Tag::Physical]))
        .unwrap();
    registry
        .add_modifiers([
            Modifier::flat(&domain, 12.0, WEAPON, [Tag::Physical]).unwrap(),
            Modifier::flat(&domain, 1.0, AURA, [Tag::Baseline, Tag::Physical]).unwrap(),
        ])
        .unwrap();
    assert_close(registry.value(physical).unwrap(), 13.0);

    registry.remove_all();
    assert_eq!(registry.modifier_count(), 0);
    assert_close(registry.value(physical).unwrap(), 0.0);

    registry
        .add_modifier(Modifier::flat(&domain, 2.0, WEAPON, [Tag::Physical]).unwrap())
        .unwrap();
    assert_close(registry.value(physical).unwrap(), 2.0);
}

#[test]
fn equal_domains_built_separately_are_compatible() {
    let domain = domain();
    let twin = CategoryDomain::of::<Tag>().unwrap().shared();
    let mut registry = Registry::new(Arc::clone(&domain));
    let fire = registry
        .add_aggregate(&requiring(&domain, &[Tag::Fire]))
        .unwrap();

    registry
        .add_modifier(Modifier::flat(&twin, 1.5, WEAPON, [Tag::Fire]).unwrap())
        .expect("domains with the same names are interchangeable");
    assert_close(registry.value(fire).unwrap(), 1.5);
}
