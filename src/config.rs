//! YAML configuration for the CLI.
//!
//! Every field has a default, so an empty file (or no file) is valid.
//! Command-line flags override whatever is loaded here.

use crate::encoder::DEFAULT_THRESHOLD;
use crate::error::{NoShowError, Result};
use crate::importance::DEFAULT_TOP_K;
use crate::report::DEFAULT_BAR_WIDTH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default model artifact location, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "final_random_forest_model.nsrf";

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Model artifact to serve
    pub model_path: PathBuf,
    /// Threshold used when `--threshold` is not given
    pub default_threshold: f64,
    /// Width of probability/confidence/importance bars
    pub bar_width: usize,
    /// Number of features in the importance chart
    pub top_features: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            default_threshold: DEFAULT_THRESHOLD,
            bar_width: DEFAULT_BAR_WIDTH,
            top_features: DEFAULT_TOP_K,
        }
    }
}

impl AppConfig {
    /// Parses and validates YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`NoShowError::Config`] if the YAML is invalid or a value is
    /// out of range.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: AppConfig = if contents.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(contents)
                .map_err(|e| NoShowError::Config(format!("failed to parse config YAML: {e}")))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file.
    ///
    /// # Errors
    ///
    /// Returns [`NoShowError::Config`] if the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            NoShowError::Config(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_yaml(&contents)
    }

    /// Loads `path` if given, otherwise returns the defaults.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`NoShowError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if !self.default_threshold.is_finite() || !(0.0..=1.0).contains(&self.default_threshold)
        {
            return Err(NoShowError::Config(format!(
                "default_threshold must be in [0, 1], got {}",
                self.default_threshold
            )));
        }
        if self.bar_width == 0 {
            return Err(NoShowError::Config("bar_width must be at least 1".into()));
        }
        if self.top_features == 0 {
            return Err(NoShowError::Config("top_features must be at least 1".into()));
        }
        Ok(())
    }
}
