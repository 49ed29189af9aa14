/// Registry configuration constants and tunable validation policy.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegistryConfig {
    /// Minimum number of children an aggregate needs when it declares no
    /// required flags of its own.
    pub min_children_without_flags: usize,
}

impl RegistryConfig {
    // ===== compile-time constants =====
    /// Index of the baseline (wildcard) category in every domain.
    pub const BASELINE_INDEX: usize = 0;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MIN_CHILDREN_WITHOUT_FLAGS: usize = 2;

    pub fn new() -> Self {
        Self {
            min_children_without_flags: Self::DEFAULT_MIN_CHILDREN_WITHOUT_FLAGS,
        }
    }

    pub fn with_min_children_without_flags(min_children_without_flags: usize) -> Self {
        Self {
            min_children_without_flags,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new()
    }
}
