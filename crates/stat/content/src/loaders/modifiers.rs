//! Modifier definition loader.
//!
//! ```ron
//! [
//!     (magnitude: 10.0, kind: Flat, source: 1, categories: ["Fire"]),
//!     (magnitude: 0.5, kind: Percent, source: 1, categories: ["Fire", "Spell"]),
//! ]
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use stat_core::{CategoryDomain, CategoryFlagSet, Modifier, ModifierKind, SourceId};

use crate::loaders::{LoadResult, read_file};

/// A modifier as written in content files, with categories referenced by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierSpec {
    pub magnitude: f64,
    pub kind: ModifierKind,
    pub source: u64,
    pub categories: Vec<String>,
}

impl ModifierSpec {
    /// Resolve category names against `domain` and build the modifier.
    pub fn build(&self, domain: &Arc<CategoryDomain>) -> LoadResult<Modifier> {
        let flags = CategoryFlagSet::from_names(Arc::clone(domain), &self.categories)
            .with_context(|| format!("Invalid categories {:?}", self.categories))?;

        Modifier::from_flags(self.magnitude, self.kind, SourceId(self.source), flags)
            .with_context(|| format!("Invalid {} modifier from source {}", self.kind, self.source))
    }
}

/// Loader for modifier definitions from RON files.
pub struct ModifierLoader;

impl ModifierLoader {
    /// Load modifier definitions without resolving them.
    pub fn load_specs(path: &Path) -> LoadResult<Vec<ModifierSpec>> {
        let content = read_file(path)?;
        Self::parse_specs(&content)
    }

    pub fn parse_specs(content: &str) -> LoadResult<Vec<ModifierSpec>> {
        ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse modifiers RON: {}", e))
    }

    /// Load modifier definitions and resolve them against `domain`.
    pub fn load(path: &Path, domain: &Arc<CategoryDomain>) -> LoadResult<Vec<Modifier>> {
        let specs = Self::load_specs(path)?;
        let modifiers = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                spec.build(domain)
                    .with_context(|| format!("Modifier #{} in {}", index, path.display()))
            })
            .collect::<LoadResult<Vec<_>>>()?;

        tracing::debug!(
            target: "stat_content",
            path = %path.display(),
            modifiers = modifiers.len(),
            "loaded modifiers"
        );
        Ok(modifiers)
    }
}
