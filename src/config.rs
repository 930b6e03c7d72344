use crate::error::{AppError, AppResult};
use serde::Deserialize;
use std::env;

mod cors;
mod rest;
mod server;

pub use cors::{CorsConfig, DEFAULT_ALLOWED_METHODS, DEFAULT_MAX_AGE_SECONDS, DEFAULT_PATH_PATTERN};
pub use rest::{RestConfig, DEFAULT_BASE_PATH};
pub use server::ServerConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub rest: RestConfig,
    pub cors: CorsConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Only the server bind address comes from the environment. The REST base
    /// path and the CORS mapping are fixed at their defaults.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| AppError::Configuration("Invalid SERVER_PORT".to_string()))?;

        let config = Config {
            server: ServerConfig {
                host: server_host,
                port: server_port,
            },
            rest: RestConfig::default(),
            cors: CorsConfig::default(),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> AppResult<()> {
        self.server.validate().map_err(AppError::Configuration)?;
        self.rest.validate()?;
        self.cors.validate().map_err(AppError::Configuration)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            rest: RestConfig::default(),
            cors: CorsConfig::default(),
        }
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.rest.base_path, "/api");
        assert_eq!(config.cors.path_pattern, "/**");
        assert!(config.cors.allows_any_origin());
        assert_eq!(
            config.cors.allowed_methods,
            vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"]
        );
        assert!(!config.cors.allowed_methods.iter().any(|m| m == "PATCH"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(config().server.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_validate_rejects_relative_base_path() {
        let mut config = config();
        config.rest.base_path = "api".to_string();
        assert!(matches!(config.validate(), Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_non_literal_base_path() {
        let mut config = config();
        config.rest.base_path = "/api//students".to_string();
        assert!(matches!(config.validate(), Err(AppError::Configuration(_))));

        config.rest.base_path = "/api/{version}".to_string();
        assert!(matches!(config.validate(), Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_empty_method_list() {
        let mut config = config();
        config.cors.allowed_methods.clear();
        assert!(matches!(config.validate(), Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = config();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }
}
