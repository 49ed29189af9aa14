//! Persisted flag set loader.
//!
//! Flag sets are stored as JSON in the [`PersistedFlags`] layout and repaired
//! against the live domain when read back.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use stat_core::{CategoryDomain, CategoryFlagSet, PersistedFlags, RepairReport};

use crate::loaders::{LoadResult, read_file};

/// Reads and writes persisted flag sets as JSON files.
pub struct FlagSetLoader;

impl FlagSetLoader {
    /// Load the raw persisted layout.
    pub fn load(path: &Path) -> LoadResult<PersistedFlags> {
        let content = read_file(path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse flag set JSON {}", path.display()))
    }

    /// Load a flag set and move it onto the live `domain`.
    pub fn restore(
        path: &Path,
        domain: Arc<CategoryDomain>,
    ) -> LoadResult<(CategoryFlagSet, RepairReport)> {
        let persisted = Self::load(path)?;
        let (flags, report) = CategoryFlagSet::restore(&persisted, domain)
            .with_context(|| format!("Corrupt flag set in {}", path.display()))?;

        if report.domain_changed {
            tracing::debug!(
                target: "stat_content",
                path = %path.display(),
                resolved = report.resolved.len(),
                pending = flags.pending().len(),
                "repaired flag set against live domain"
            );
        }
        Ok((flags, report))
    }

    /// Write `flags` in the persisted layout, pretty-printed.
    pub fn save(path: &Path, flags: &CategoryFlagSet) -> LoadResult<()> {
        let json = serde_json::to_string_pretty(&flags.to_persisted())
            .context("Failed to serialize flag set to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write flag set {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn domain(names: &[&str]) -> Arc<CategoryDomain> {
        CategoryDomain::new(names.iter().copied()).unwrap().shared()
    }

    #[test]
    fn save_then_restore_under_new_domain() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("flags.json");

        let old = domain(&["Baseline", "A", "B", "C"]);
        let flags = CategoryFlagSet::from_names(old, ["A", "C"]).unwrap();
        FlagSetLoader::save(&path, &flags).unwrap();

        let (restored, report) =
            FlagSetLoader::restore(&path, domain(&["Baseline", "B", "C", "D"])).unwrap();
        assert!(report.domain_changed);
        assert_eq!(restored.active_names(), vec!["C"]);
        assert_eq!(restored.pending(), ["A".to_string()]);
    }

    #[test]
    fn corrupt_file_is_reported_with_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        std::fs::write(&path, r#"{"bits":"10","names":["Baseline"]}"#).unwrap();

        let err = FlagSetLoader::restore(&path, domain(&["Baseline"])).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(FlagSetLoader::load(&temp.path().join("absent.json")).is_err());
    }
}
