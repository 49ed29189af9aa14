//! Aggregate definition loader.
//!
//! Each entry names an aggregate; children refer to entries listed earlier in
//! the same file, which keeps the child graph acyclic.
//!
//! ```ron
//! [
//!     (name: "fire", required: ["Fire"]),
//!     (name: "cold", required: ["Cold"]),
//!     (name: "elemental", children: ["fire", "cold"]),
//! ]
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use stat_core::{AggregateId, AggregateKey, CategoryDomain, CategoryFlagSet, Registry};

use crate::loaders::{LoadResult, read_file};

/// An aggregate as written in content files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSpec {
    pub name: String,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub children: Vec<String>,
}

/// An aggregate registered from content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedAggregate {
    pub name: String,
    pub id: AggregateId,
}

/// Loader for aggregate definitions from RON files.
pub struct AggregateLoader;

impl AggregateLoader {
    pub fn load_specs(path: &Path) -> LoadResult<Vec<AggregateSpec>> {
        let content = read_file(path)?;
        Self::parse_specs(&content)
    }

    pub fn parse_specs(content: &str) -> LoadResult<Vec<AggregateSpec>> {
        ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse aggregates RON: {}", e))
    }

    /// Load aggregate definitions and register them into `registry`, in file order.
    pub fn load_into(path: &Path, registry: &mut Registry) -> LoadResult<Vec<LoadedAggregate>> {
        let specs = Self::load_specs(path)?;
        Self::register(&specs, registry)
            .with_context(|| format!("Failed to register aggregates from {}", path.display()))
    }

    /// Register already parsed definitions into `registry`, in order.
    pub fn register(
        specs: &[AggregateSpec],
        registry: &mut Registry,
    ) -> LoadResult<Vec<LoadedAggregate>> {
        let domain = Arc::clone(registry.domain());
        let mut by_name: HashMap<&str, AggregateId> = HashMap::with_capacity(specs.len());
        let mut loaded = Vec::with_capacity(specs.len());

        for spec in specs {
            if by_name.contains_key(spec.name.as_str()) {
                bail!("Aggregate `{}` is defined twice", spec.name);
            }

            let key = Self::key_for(spec, &domain, &by_name)?;
            let id = registry
                .add_aggregate(&key)
                .with_context(|| format!("Aggregate `{}`", spec.name))?;

            by_name.insert(spec.name.as_str(), id);
            loaded.push(LoadedAggregate {
                name: spec.name.clone(),
                id,
            });
        }

        tracing::debug!(
            target: "stat_content",
            aggregates = loaded.len(),
            "registered aggregates"
        );
        Ok(loaded)
    }

    fn key_for(
        spec: &AggregateSpec,
        domain: &Arc<CategoryDomain>,
        by_name: &HashMap<&str, AggregateId>,
    ) -> LoadResult<AggregateKey> {
        let mut key = AggregateKey::new();

        if !spec.required.is_empty() {
            let flags = CategoryFlagSet::from_names(Arc::clone(domain), &spec.required)
                .with_context(|| format!("Aggregate `{}` requires unknown category", spec.name))?;
            key = key.flags(flags);
        }

        for child in &spec.children {
            let Some(&id) = by_name.get(child.as_str()) else {
                bail!(
                    "Aggregate `{}` lists child `{}`, which is not defined before it",
                    spec.name,
                    child
                );
            };
            key = key.child(id);
        }

        Ok(key)
    }
}
