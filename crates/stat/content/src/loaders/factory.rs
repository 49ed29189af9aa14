//! Content factory for building registries from data files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use stat_core::{CategoryDomain, Modifier, Registry, RegistryConfig};

use crate::loaders::{
    AggregateLoader, ConfigLoader, DomainLoader, LoadResult, LoadedAggregate, ModifierLoader,
};

/// Content factory that loads stat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml       (optional)
/// ├── domain.ron
/// ├── modifiers.ron
/// └── aggregates.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load registry configuration from `config.toml`, or the default if absent.
    pub fn load_config(&self) -> LoadResult<RegistryConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(
                target: "stat_content",
                path = %path.display(),
                "no config file, using defaults"
            );
            return Ok(RegistryConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the category domain from `domain.ron`.
    pub fn load_domain(&self) -> LoadResult<Arc<CategoryDomain>> {
        DomainLoader::load(&self.data_dir.join("domain.ron"))
    }

    /// Load modifiers from `modifiers.ron`, resolved against `domain`.
    pub fn load_modifiers(&self, domain: &Arc<CategoryDomain>) -> LoadResult<Vec<Modifier>> {
        ModifierLoader::load(&self.data_dir.join("modifiers.ron"), domain)
    }

    /// Build a registry holding every aggregate and modifier in the data directory.
    ///
    /// Aggregates are registered first, then modifiers are added.
    pub fn build_registry(&self) -> LoadResult<(Registry, Vec<LoadedAggregate>)> {
        let config = self.load_config()?;
        let domain = self.load_domain()?;
        let modifiers = self.load_modifiers(&domain)?;

        let mut registry = Registry::with_config(domain, config);
        let aggregates =
            AggregateLoader::load_into(&self.data_dir.join("aggregates.ron"), &mut registry)?;
        registry
            .add_modifiers(modifiers)
            .map_err(|e| anyhow::anyhow!("Failed to add modifiers: {}", e))?;

        tracing::info!(
            target: "stat_content",
            data_dir = %self.data_dir.display(),
            aggregates = registry.aggregate_count(),
            modifiers = registry.modifier_count(),
            "built registry from content"
        );
        Ok((registry, aggregates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn setup() -> TempDir {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "domain.ron", r#"["Baseline", "Fire", "Cold"]"#);
        write(
            temp.path(),
            "modifiers.ron",
            r#"[
                (magnitude: 10.0, kind: Flat, source: 1, categories: ["Fire"]),
                (magnitude: 0.5, kind: Percent, source: 1, categories: ["Fire"]),
                (magnitude: 1.2, kind: Multiplicative, source: 2, categories: ["Fire"]),
            ]"#,
        );
        write(
            temp.path(),
            "aggregates.ron",
            r#"[(name: "fire", required: ["Fire"])]"#,
        );
        temp
    }

    #[test]
    fn builds_registry_without_config() {
        let temp = setup();
        let (registry, aggregates) = ContentFactory::new(temp.path()).build_registry().unwrap();

        assert_eq!(registry.config(), &RegistryConfig::default());
        assert_eq!(aggregates.len(), 1);
        let value = registry.value(aggregates[0].id).unwrap();
        assert!((value - 18.0).abs() < 1e-9);
    }

    #[test]
    fn config_file_changes_policy() {
        let temp = setup();
        write(temp.path(), "config.toml", "min_children_without_flags = 1\n");
        write(
            temp.path(),
            "aggregates.ron",
            r#"[(name: "fire", required: ["Fire"]), (name: "wrapped", children: ["fire"])]"#,
        );

        let (registry, aggregates) = ContentFactory::new(temp.path()).build_registry().unwrap();
        assert_eq!(registry.config().min_children_without_flags, 1);
        assert_eq!(
            registry.aggregate(aggregates[1].id).unwrap().signature(),
            "(Fire)"
        );
    }

    #[test]
    fn missing_domain_fails() {
        let temp = TempDir::new().unwrap();
        assert!(ContentFactory::new(temp.path()).build_registry().is_err());
    }
}
