//! Analysis configuration
//!
//! Defaults for the caller-supplied bounds and naming conventions. Read from
//! the `[analysis]` table of a TOML file; every key is optional.
//!
//! ```toml
//! [analysis]
//! max_paths = 25
//! hub_threshold = 8
//! impact_max_depth = 3
//! reference_scan_depth = 6
//! bidirectional_property = "realizes"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{ArchModelError, Result};

pub const DEFAULT_MAX_PATHS: usize = 10;
pub const DEFAULT_HUB_THRESHOLD: usize = 10;
pub const DEFAULT_REFERENCE_SCAN_DEPTH: usize = 8;
pub const DEFAULT_BIDIRECTIONAL_PROPERTY: &str = "realizes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Path enumeration cutoff used when the caller passes none
    pub max_paths: usize,

    /// Minimum total degree for an element to count as a hub
    pub hub_threshold: usize,

    /// Hop limit for impact analysis; unlimited when unset
    pub impact_max_depth: Option<usize>,

    /// How many levels of nested property maps the reference scan descends
    pub reference_scan_depth: usize,

    /// Property written on projected elements to point back at their source
    pub bidirectional_property: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_paths: DEFAULT_MAX_PATHS,
            hub_threshold: DEFAULT_HUB_THRESHOLD,
            impact_max_depth: None,
            reference_scan_depth: DEFAULT_REFERENCE_SCAN_DEPTH,
            bidirectional_property: DEFAULT_BIDIRECTIONAL_PROPERTY.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    analysis: AnalysisConfig,
}

impl AnalysisConfig {
    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on malformed TOML, unknown keys, or out-of-range values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        file.analysis.validate()?;
        Ok(file.analysis)
    }

    /// Read configuration from a TOML file
    ///
    /// # Errors
    ///
    /// `Io` when the file cannot be read, otherwise as `from_toml_str`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when `max_paths` is zero or the back-reference property is blank.
    pub fn validate(&self) -> Result<()> {
        if self.max_paths == 0 {
            return Err(ArchModelError::InvalidConfig {
                reason: "max_paths must be at least 1".to_string(),
            });
        }
        if self.bidirectional_property.trim().is_empty() {
            return Err(ArchModelError::InvalidConfig {
                reason: "bidirectional_property cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
