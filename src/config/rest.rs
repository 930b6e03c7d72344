use crate::error::AppResult;
use crate::rest::BasePath;
use serde::Deserialize;

/// Base path under which the repository resources are exposed
pub const DEFAULT_BASE_PATH: &str = "/api";

/// Repository REST exposure configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RestConfig {
    /// Path prefix for every auto-exposed collection and item endpoint
    pub base_path: String,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
        }
    }
}

impl RestConfig {
    /// Validate REST exposure configuration values
    pub fn validate(&self) -> AppResult<()> {
        BasePath::parse(&self.base_path).map(|_| ())
    }
}
