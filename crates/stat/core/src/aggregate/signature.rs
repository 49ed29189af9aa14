//! Canonical aggregate signatures.
//!
//! Format: sorted required category names joined by `+`, followed by each
//! child's signature in parentheses, children sorted by signature.
//!
//! ```text
//! required {Melee, Fire}, no children        → "Fire+Melee"
//! no required, children "Fire" and "Cold"    → "(Cold)(Fire)"
//! required {Physical}, child "Fire+Melee"    → "Physical(Fire+Melee)"
//! ```
//!
//! Category names cannot contain `+`, `(` or `)` (see
//! [`RESERVED_NAME_CHARS`](crate::category::RESERVED_NAME_CHARS)), so distinct
//! keys never share a signature.

use crate::category::CategoryFlagSet;

const NAME_SEPARATOR: &str = "+";

/// Build the order-independent signature for a required flag set and the
/// signatures of its children.
pub fn canonical_signature<'a>(
    required: Option<&CategoryFlagSet>,
    child_signatures: impl IntoIterator<Item = &'a str>,
) -> String {
    let mut names: Vec<&str> = required.map(CategoryFlagSet::active_names).unwrap_or_default();
    names.sort_unstable();

    let mut children: Vec<&str> = child_signatures.into_iter().collect();
    children.sort_unstable();

    let mut signature = names.join(NAME_SEPARATOR);
    for child in children {
        signature.push('(');
        signature.push_str(child);
        signature.push(')');
    }
    signature
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryDomain;

    #[test]
    fn names_are_sorted_regardless_of_index_order() {
        let domain = CategoryDomain::new(["Baseline", "Melee", "Fire", "Axe"])
            .unwrap()
            .shared();
        let flags = CategoryFlagSet::from_names(domain, ["Melee", "Axe", "Fire"]).unwrap();
        assert_eq!(
            canonical_signature(Some(&flags), Vec::<&str>::new()),
            "Axe+Fire+Melee"
        );
    }

    #[test]
    fn children_are_sorted_and_parenthesised() {
        let domain = CategoryDomain::new(["Baseline", "Physical"])
            .unwrap()
            .shared();
        let flags = CategoryFlagSet::from_names(domain, ["Physical"]).unwrap();

        assert_eq!(
            canonical_signature(None, ["Fire", "Cold"]),
            canonical_signature(None, ["Cold", "Fire"])
        );
        assert_eq!(canonical_signature(None, ["Fire", "Cold"]), "(Cold)(Fire)");
        assert_eq!(
            canonical_signature(Some(&flags), ["Fire+Melee"]),
            "Physical(Fire+Melee)"
        );
    }
}
