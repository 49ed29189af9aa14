//! Registry configuration loader.

use std::path::Path;

use stat_core::RegistryConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for registry configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys fall back to [`RegistryConfig::default`].
    pub fn load(path: &Path) -> LoadResult<RegistryConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<RegistryConfig> {
        let config: RegistryConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ConfigLoader::parse("").unwrap();
        assert_eq!(config, RegistryConfig::default());
    }

    #[test]
    fn min_children_is_read() {
        let config = ConfigLoader::parse("min_children_without_flags = 1\n").unwrap();
        assert_eq!(config.min_children_without_flags, 1);
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(ConfigLoader::parse("min_children_without_flags = \"two\"").is_err());
    }
}
