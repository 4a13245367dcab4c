use crate::errors::ApiError;
use serde::Deserialize;
use std::path::Path;

/// Catalog-wide tuning knobs applied to every resource descriptor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Page size used when the client sends no `limit`.
    pub default_limit: u64,
    /// Hard ceiling; larger client limits are clamped, not rejected.
    pub max_limit: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { default_limit: 10, max_limit: 250 }
    }
}

impl CatalogConfig {
    /// Loads the config from a TOML file. Unknown keys are ignored; missing
    /// keys fall back to the defaults.
    ///
    /// # Errors
    /// `ApiError::Config` when the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ApiError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ApiError::Config(format!("read {}: {e}", path.as_ref().display())))?;
        toml::from_str(&raw).map_err(|e| ApiError::Config(e.to_string()))
    }
}
