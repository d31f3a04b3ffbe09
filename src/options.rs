//! Realization options.
//!
//! ```yaml
//! path_separator: "/"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::RealizeError;
use crate::path::PATH_SEPARATOR;

/// Options for rendering realizations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealizeOptions {
    /// Separator joining path positions in specification keys
    pub path_separator: String,
}

impl Default for RealizeOptions {
    fn default() -> Self {
        Self {
            path_separator: PATH_SEPARATOR.to_string(),
        }
    }
}

impl RealizeOptions {
    /// Options with a custom path separator.
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            path_separator: separator.into(),
        }
    }

    /// Parse options from YAML. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RealizeError> {
        let options: Self = serde_yaml::from_str(yaml)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), RealizeError> {
        if self.path_separator.is_empty() {
            return Err(RealizeError::Config(
                "path_separator must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
