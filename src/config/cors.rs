use serde::Deserialize;

/// Path pattern the CORS mapping is registered for
pub const DEFAULT_PATH_PATTERN: &str = "/**";

/// Methods a cross-origin request may use
pub const DEFAULT_ALLOWED_METHODS: [&str; 5] = ["GET", "POST", "PUT", "DELETE", "OPTIONS"];

/// How long browsers may cache a preflight answer
pub const DEFAULT_MAX_AGE_SECONDS: u64 = 1800;

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Ant-style pattern of the paths this mapping covers
    pub path_pattern: String,

    /// List of allowed origins for CORS (use ["*"] for all origins)
    pub allowed_origins: Vec<String>,

    /// HTTP methods permitted on cross-origin requests
    pub allowed_methods: Vec<String>,

    /// Preflight cache lifetime in seconds
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            path_pattern: DEFAULT_PATH_PATTERN.to_string(),
            allowed_origins: vec!["*".to_string()],
            allowed_methods: DEFAULT_ALLOWED_METHODS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            max_age_seconds: DEFAULT_MAX_AGE_SECONDS,
        }
    }
}

impl CorsConfig {
    /// Validate CORS configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.allowed_origins.is_empty() {
            return Err("CORS mapping needs at least one allowed origin".to_string());
        }

        if self.allowed_methods.is_empty() {
            return Err("CORS mapping needs at least one allowed method".to_string());
        }

        Ok(())
    }

    /// Whether the mapping accepts any origin
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}
