//! Configuration types for the points importer.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::reader::Encoding;

/// Errors raised while decoding import options from key/value pairs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("could not parse radius '{0}'")]
    InvalidRadius(String),
}

/// Options controlling how a points file is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Radius given to every sphere when the format has no `r` field
    #[serde(default = "default_radius")]
    pub radius: f32,

    /// Per-record layout, one character per float (e.g. "xyzr", "xyzs")
    #[serde(default = "default_format")]
    pub format: String,

    /// Read whitespace-separated text instead of raw binary floats
    #[serde(default)]
    pub ascii: bool,
}

fn default_radius() -> f32 {
    0.1
}

fn default_format() -> String {
    "xyz".to_string()
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            format: default_format(),
            ascii: false,
        }
    }
}

impl ImportOptions {
    /// Decode options from already-split key/value pairs.
    ///
    /// Recognized keys are `radius`, `format` and `ascii`. `ascii` is a
    /// presence flag and its value is ignored. Unknown keys are skipped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "radius" => {
                    options.radius = value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidRadius(value.to_string()))?;
                }
                "format" => options.format = value.to_string(),
                "ascii" => options.ascii = true,
                other => log::debug!("Ignoring unknown import option '{}'", other),
            }
        }
        Ok(options)
    }

    /// Record encoding selected by the `ascii` flag.
    pub fn encoding(&self) -> Encoding {
        if self.ascii {
            Encoding::Text
        } else {
            Encoding::Binary
        }
    }

    /// Load options from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let options: ImportOptions = serde_yaml::from_str(&content)?;
        Ok(options)
    }

    /// Save options to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
