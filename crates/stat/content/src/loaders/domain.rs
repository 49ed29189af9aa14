//! Category domain loader.
//!
//! A domain file is a RON list of category names in index order. The first
//! entry is the baseline category:
//!
//! ```ron
//! ["Baseline", "Physical", "Fire", "Cold", "Melee", "Spell"]
//! ```

use std::path::Path;
use std::sync::Arc;

use stat_core::CategoryDomain;

use crate::loaders::{LoadResult, read_file};

/// Loader for category domains from RON files.
pub struct DomainLoader;

impl DomainLoader {
    /// Load and validate a domain, ready for sharing between flag sets.
    pub fn load(path: &Path) -> LoadResult<Arc<CategoryDomain>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Arc<CategoryDomain>> {
        let names: Vec<String> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse domain RON: {}", e))?;

        let domain = CategoryDomain::new(names)
            .map_err(|e| anyhow::anyhow!("Invalid category domain: {}", e))?;

        tracing::debug!(
            target: "stat_content",
            categories = domain.len(),
            baseline = domain.baseline_name(),
            "loaded category domain"
        );
        Ok(domain.shared())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_keep_file_order() {
        let domain = DomainLoader::parse(r#"["Baseline", "Fire", "Cold"]"#).unwrap();
        assert_eq!(domain.names(), &["Baseline", "Fire", "Cold"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = DomainLoader::parse(r#"["Baseline", "Fire", "Fire"]"#).unwrap_err();
        assert!(err.to_string().contains("Fire"));
    }

    #[test]
    fn signature_delimiters_are_rejected() {
        let err = DomainLoader::parse(r#"["Baseline", "Fire+Cold"]"#).unwrap_err();
        assert!(err.to_string().contains("reserved characters"));
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(DomainLoader::parse("[]").is_err());
    }
}
