use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::IndexResult, key::RetrieveMode};

/// Settings of an [`AbstruseIndex`](crate::index::AbstruseIndex).
///
/// Loadable from TOML; missing fields take their default:
/// ```
/// use abstruse::config::IndexConfig;
/// use abstruse::key::RetrieveMode;
///
/// let config = IndexConfig::from_toml_str("max_level = 4\ndefault_mode = \"exact\"").unwrap();
/// assert_eq!(config.max_level, Some(4));
/// assert_eq!(config.default_mode, RetrieveMode::Exact);
/// assert_eq!(IndexConfig::from_toml_str("").unwrap(), IndexConfig::default());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Deepest level that still refines its entries. A node at this level keeps every value that
    /// reaches it, whatever structure is left. `None` refines until keys become terminal.
    pub max_level: Option<usize>,

    /// Mode used by [`AbstruseIndex::retrieve_default`](crate::index::AbstruseIndex::retrieve_default).
    pub default_mode: RetrieveMode,
}

impl IndexConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> IndexResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> IndexResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Whether a node at `level` stops refining.
    #[inline]
    pub(crate) fn is_capped(&self, level: usize) -> bool {
        self.max_level.is_some_and(|max| level >= max)
    }
}
