//! `.inheritmap.toml` configuration.
//!
//! ```toml
//! [similarity]
//! cutoff = 0.8
//! method = "permute"
//!
//! [colors]
//! default = "#000000"
//! override = "#ff0000"
//!
//! [hierarchy]
//! exclude = ["Mixin"]
//! max_depth = 4
//!
//! [modules]
//! search_paths = ["manifests"]
//! ```
//!
//! Every section is optional; command-line flags override file values.

mod loader;

pub use loader::{
    directory_ancestors, load_config, load_config_from, parse_and_validate_config,
    CONFIG_FILE_NAME,
};

use crate::errors::{Error, Result};
use crate::hierarchy::NodeColors;
use crate::similarity::{SimilarityMethod, DEFAULT_CUTOFF};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InheritmapConfig {
    #[serde(default)]
    pub similarity: SimilarityConfig,

    #[serde(default)]
    pub colors: NodeColors,

    #[serde(default)]
    pub hierarchy: HierarchyConfig,

    #[serde(default)]
    pub modules: ModulesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Minimum fraction for two overrides to cluster together
    #[serde(default = "default_cutoff")]
    pub cutoff: f64,

    #[serde(default)]
    pub method: SimilarityMethod,
}

fn default_cutoff() -> f64 {
    DEFAULT_CUTOFF
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            cutoff: default_cutoff(),
            method: SimilarityMethod::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyConfig {
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModulesConfig {
    /// Directories searched for module manifests, relative to the working directory
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,
}

impl InheritmapConfig {
    pub fn validate(&self) -> Result<()> {
        let cutoff = self.similarity.cutoff;
        if !(0.0..=1.0).contains(&cutoff) {
            return Err(Error::Configuration(format!(
                "similarity.cutoff must be within [0, 1], found {cutoff}"
            )));
        }
        Ok(())
    }
}
