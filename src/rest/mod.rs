//! Base path and cross-origin registration for the exposed REST layer.
//!
//! [`configure`] is called once while the server starts. It produces an
//! immutable [`RestSettings`] that the router builder uses to mount the
//! repository resources under the base path and to wrap every route in the
//! CORS mapping.

mod base_path;
mod cors;
mod path_pattern;

pub use base_path::BasePath;
pub use cors::{cors_guard, is_preflight, is_same_origin, AllowedOrigins, CorsCheck, CorsPolicy};
pub use path_pattern::PathPattern;

use crate::config::{CorsConfig, RestConfig};
use crate::error::AppResult;
use axum::{middleware, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// Process-wide REST settings, fixed after startup.
#[derive(Debug, Clone)]
pub struct RestSettings {
    base_path: BasePath,
    cors: Arc<CorsPolicy>,
}

/// Register the base path and the CORS mapping.
pub fn configure(rest: &RestConfig, cors: &CorsConfig) -> AppResult<RestSettings> {
    let base_path = BasePath::parse(&rest.base_path)?;
    info!(base_path = %base_path, "Repository resources exposed under base path");

    let policy = CorsPolicy::from_config(cors)?;
    info!(
        pattern = %policy.pattern(),
        origins = %cors.allowed_origins.join(","),
        methods = %join_methods(&policy),
        max_age_secs = policy.max_age().as_secs(),
        "Registered CORS mapping"
    );

    Ok(RestSettings {
        base_path,
        cors: Arc::new(policy),
    })
}

fn join_methods(policy: &CorsPolicy) -> String {
    policy
        .methods()
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

impl RestSettings {
    pub fn base_path(&self) -> &BasePath {
        &self.base_path
    }

    pub fn cors(&self) -> &CorsPolicy {
        &self.cors
    }

    /// Mount the exposed resources under the base path.
    pub fn mount<S>(&self, resources: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        if self.base_path.is_root() {
            resources
        } else {
            Router::new().nest(self.base_path.as_str(), resources)
        }
    }

    /// Wrap every route of `app` (fallback included) in the CORS mapping.
    ///
    /// Must be called after all routes and the fallback are registered.
    pub fn apply_cors(&self, app: Router) -> Router {
        app.layer(self.cors.layer())
            .layer(middleware::from_fn_with_state(self.cors.clone(), cors_guard))
    }

    /// Effective settings, as printed by `show-config`.
    pub fn describe(&self) -> Value {
        let origins: Vec<String> = match self.cors.origins() {
            AllowedOrigins::Any => vec!["*".to_string()],
            AllowedOrigins::List(list) => list
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect(),
        };

        json!({
            "basePath": self.base_path.as_str(),
            "cors": {
                "pathPattern": self.cors.pattern().as_str(),
                "allowedOrigins": origins,
                "allowedMethods": self.cors.methods().iter().map(|m| m.as_str()).collect::<Vec<_>>(),
                "allowedHeaders": ["*"],
                "maxAgeSeconds": self.cors.max_age().as_secs(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_defaults() {
        let settings = configure(&RestConfig::default(), &CorsConfig::default()).unwrap();
        assert_eq!(settings.base_path().as_str(), "/api");
        assert_eq!(settings.cors().pattern().as_str(), "/**");
    }

    #[test]
    fn test_configure_rejects_relative_base_path() {
        let rest = RestConfig {
            base_path: "api".to_string(),
        };
        assert!(configure(&rest, &CorsConfig::default()).is_err());
    }

    #[test]
    fn test_configure_rejects_bad_pattern() {
        let cors = CorsConfig {
            path_pattern: "api".to_string(),
            ..CorsConfig::default()
        };
        assert!(configure(&RestConfig::default(), &cors).is_err());
    }

    #[test]
    fn test_describe() {
        let settings = configure(&RestConfig::default(), &CorsConfig::default()).unwrap();
        let described = settings.describe();
        assert_eq!(described["basePath"], "/api");
        assert_eq!(described["cors"]["pathPattern"], "/**");
        assert_eq!(described["cors"]["allowedOrigins"][0], "*");
        assert_eq!(
            described["cors"]["allowedMethods"],
            json!(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        );
        assert_eq!(described["cors"]["maxAgeSeconds"], 1800);
    }
}
