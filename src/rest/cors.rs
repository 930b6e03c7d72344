//! Cross-origin policy for every route of the server.
//!
//! `tower_http`'s `CorsLayer` writes the `Access-Control-*` headers but lets
//! any method through on actual requests. The guard middleware sits in front
//! of it and turns away cross-origin requests (and preflights) asking for a
//! method or origin outside the mapping, the way a browser-facing CORS
//! processor is expected to.

use crate::config::CorsConfig;
use crate::error::{AppError, AppResult};
use axum::{
    extract::{Request, State},
    http::{header, uri::Authority, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use url::Url;

use super::path_pattern::PathPattern;

const REJECTION_BODY: &str = "Invalid CORS request";

#[derive(Debug, Clone)]
pub enum AllowedOrigins {
    Any,
    List(Vec<HeaderValue>),
}

/// Outcome of checking a request against the mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsCheck {
    /// No `Origin`, or the origin is the server itself
    NotCors,
    Allowed,
    RejectedOrigin,
    RejectedMethod(String),
}

/// The CORS mapping registered at startup.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    pattern: PathPattern,
    origins: AllowedOrigins,
    methods: Vec<Method>,
    max_age: Duration,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> AppResult<Self> {
        config.validate().map_err(AppError::Configuration)?;

        let pattern = PathPattern::parse(&config.path_pattern)?;

        let origins = if config.allows_any_origin() {
            AllowedOrigins::Any
        } else {
            let list = config
                .allowed_origins
                .iter()
                .map(|origin| {
                    HeaderValue::from_str(origin.trim()).map_err(|_| {
                        AppError::Configuration(format!("invalid CORS origin '{}'", origin))
                    })
                })
                .collect::<AppResult<Vec<_>>>()?;
            AllowedOrigins::List(list)
        };

        let mut methods: Vec<Method> = Vec::with_capacity(config.allowed_methods.len());
        for raw in &config.allowed_methods {
            let method = Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes())
                .map_err(|_| AppError::Configuration(format!("invalid CORS method '{}'", raw)))?;
            if !methods.contains(&method) {
                methods.push(method);
            }
        }

        Ok(Self {
            pattern,
            origins,
            methods,
            max_age: Duration::from_secs(config.max_age_seconds),
        })
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn origins(&self) -> &AllowedOrigins {
        &self.origins
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn applies_to(&self, path: &str) -> bool {
        self.pattern.matches(path)
    }

    pub fn permits_method(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    pub fn permits_origin(&self, origin: &HeaderValue) -> bool {
        match &self.origins {
            AllowedOrigins::Any => true,
            AllowedOrigins::List(list) => list.iter().any(|allowed| allowed == origin),
        }
    }

    /// Classify a request that falls under the mapping's path pattern.
    pub fn check(&self, method: &Method, uri: &Uri, headers: &HeaderMap) -> CorsCheck {
        let Some(origin) = headers.get(header::ORIGIN) else {
            return CorsCheck::NotCors;
        };

        if is_same_origin(origin, uri, headers) {
            return CorsCheck::NotCors;
        }

        if !self.permits_origin(origin) {
            return CorsCheck::RejectedOrigin;
        }

        let requested = if is_preflight(method, headers) {
            let raw = headers
                .get(header::ACCESS_CONTROL_REQUEST_METHOD)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            match Method::from_bytes(raw.trim().as_bytes()) {
                Ok(m) => m,
                Err(_) => return CorsCheck::RejectedMethod(raw.to_string()),
            }
        } else {
            method.clone()
        };

        if self.permits_method(&requested) {
            CorsCheck::Allowed
        } else {
            CorsCheck::RejectedMethod(requested.to_string())
        }
    }

    /// The `tower_http` layer that writes the CORS response headers.
    pub fn layer(&self) -> CorsLayer {
        let allow_origin = match &self.origins {
            AllowedOrigins::Any => AllowOrigin::any(),
            AllowedOrigins::List(list) => AllowOrigin::list(list.iter().cloned()),
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(AllowMethods::list(self.methods.iter().cloned()))
            .allow_headers(AllowHeaders::any())
            .max_age(self.max_age)
    }
}

pub fn is_preflight(method: &Method, headers: &HeaderMap) -> bool {
    *method == Method::OPTIONS && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

/// Compare the `Origin` with the authority the request was sent to.
///
/// The authority is the `Host` header, or the request target's authority when
/// there is none (HTTP/2 `:authority`, absolute-form targets). An authority
/// without a port is taken to use the default port of the origin's scheme.
/// An unparseable origin (including `null`) is never same-origin.
pub fn is_same_origin(origin: &HeaderValue, uri: &Uri, headers: &HeaderMap) -> bool {
    let Some(origin) = origin.to_str().ok().and_then(|o| Url::parse(o).ok()) else {
        return false;
    };
    let (Some(origin_host), Some(origin_port)) = (origin.host_str(), origin.port_or_known_default())
    else {
        return false;
    };
    let Some(authority) = request_authority(uri, headers) else {
        return false;
    };

    authority.host().eq_ignore_ascii_case(origin_host)
        && authority.port_u16().unwrap_or(origin_port) == origin_port
}

fn request_authority(uri: &Uri, headers: &HeaderMap) -> Option<Authority> {
    match headers.get(header::HOST) {
        Some(host) => host.to_str().ok()?.trim().parse().ok(),
        None => uri.authority().cloned(),
    }
}

fn strip_cors_request_headers(headers: &mut HeaderMap) {
    headers.remove(header::ORIGIN);
    headers.remove(header::ACCESS_CONTROL_REQUEST_METHOD);
    headers.remove(header::ACCESS_CONTROL_REQUEST_HEADERS);
}

fn strip_cors_response_headers(headers: &mut HeaderMap) {
    let names: Vec<_> = headers
        .keys()
        .filter(|name| name.as_str().starts_with("access-control-"))
        .cloned()
        .collect();
    for name in names {
        headers.remove(name);
    }
}

/// Middleware enforcing the mapping ahead of [`CorsPolicy::layer`].
pub async fn cors_guard(
    State(policy): State<Arc<CorsPolicy>>,
    mut req: Request,
    next: Next,
) -> Response {
    if !policy.applies_to(req.uri().path()) {
        strip_cors_request_headers(req.headers_mut());
        let mut response = next.run(req).await;
        strip_cors_response_headers(response.headers_mut());
        return response;
    }

    match policy.check(req.method(), req.uri(), req.headers()) {
        CorsCheck::NotCors | CorsCheck::Allowed => next.run(req).await,
        CorsCheck::RejectedOrigin => {
            tracing::warn!(
                path = %req.uri().path(),
                origin = ?req.headers().get(header::ORIGIN),
                "Rejected cross-origin request from disallowed origin"
            );
            (StatusCode::FORBIDDEN, REJECTION_BODY).into_response()
        }
        CorsCheck::RejectedMethod(method) => {
            tracing::warn!(
                path = %req.uri().path(),
                method = %method,
                "Rejected cross-origin request with disallowed method"
            );
            (StatusCode::FORBIDDEN, REJECTION_BODY).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> CorsPolicy {
        CorsPolicy::from_config(&CorsConfig::default()).unwrap()
    }

    fn path() -> Uri {
        Uri::from_static("/api/students/1")
    }

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, value.parse().unwrap());
        }
        headers
    }

    #[test]
    fn test_default_policy() {
        let policy = policy();
        assert!(matches!(policy.origins(), AllowedOrigins::Any));
        assert_eq!(
            policy.methods(),
            &[
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS
            ]
        );
        assert!(!policy.permits_method(&Method::PATCH));
        assert_eq!(policy.max_age(), Duration::from_secs(1800));
        assert!(policy.applies_to("/anything/at/all"));
    }

    #[test]
    fn test_methods_are_normalized_and_deduplicated() {
        let config = CorsConfig {
            allowed_methods: vec!["get".to_string(), "GET".to_string(), " post ".to_string()],
            ..CorsConfig::default()
        };
        let policy = CorsPolicy::from_config(&config).unwrap();
        assert_eq!(policy.methods(), &[Method::GET, Method::POST]);
    }

    #[test]
    fn test_invalid_origin_is_a_configuration_error() {
        let config = CorsConfig {
            allowed_origins: vec!["http://bad\norigin".to_string()],
            ..CorsConfig::default()
        };
        assert!(matches!(
            CorsPolicy::from_config(&config),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_check_without_origin() {
        assert_eq!(
            policy().check(&Method::PATCH, &path(), &HeaderMap::new()),
            CorsCheck::NotCors
        );
    }

    #[test]
    fn test_check_cross_origin_methods() {
        let policy = policy();
        let cross = headers(&[("origin", "http://example.com"), ("host", "localhost:8080")]);
        assert_eq!(policy.check(&Method::GET, &path(), &cross), CorsCheck::Allowed);
        assert_eq!(policy.check(&Method::DELETE, &path(), &cross), CorsCheck::Allowed);
        assert_eq!(
            policy.check(&Method::PATCH, &path(), &cross),
            CorsCheck::RejectedMethod("PATCH".to_string())
        );
    }

    #[test]
    fn test_check_preflight_uses_requested_method() {
        let policy = policy();
        let allowed = headers(&[
            ("origin", "http://example.com"),
            ("access-control-request-method", "PUT"),
        ]);
        assert_eq!(policy.check(&Method::OPTIONS, &path(), &allowed), CorsCheck::Allowed);

        let rejected = headers(&[
            ("origin", "http://example.com"),
            ("access-control-request-method", "PATCH"),
        ]);
        assert_eq!(
            policy.check(&Method::OPTIONS, &path(), &rejected),
            CorsCheck::RejectedMethod("PATCH".to_string())
        );
    }

    #[test]
    fn test_check_same_origin_is_not_cors() {
        let same = headers(&[("origin", "http://localhost:8080"), ("host", "localhost:8080")]);
        assert_eq!(policy().check(&Method::PATCH, &path(), &same), CorsCheck::NotCors);
    }

    #[test]
    fn test_check_same_origin_from_request_target() {
        let target = Uri::from_static("http://localhost:8080/api/students/1");
        let same = headers(&[("origin", "http://localhost:8080")]);
        assert_eq!(policy().check(&Method::PATCH, &target, &same), CorsCheck::NotCors);

        let cross = headers(&[("origin", "http://example.com")]);
        assert_eq!(
            policy().check(&Method::PATCH, &target, &cross),
            CorsCheck::RejectedMethod("PATCH".to_string())
        );
    }

    #[test]
    fn test_check_origin_list() {
        let config = CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            ..CorsConfig::default()
        };
        let policy = CorsPolicy::from_config(&config).unwrap();

        let allowed = headers(&[("origin", "http://localhost:3000")]);
        assert_eq!(policy.check(&Method::GET, &path(), &allowed), CorsCheck::Allowed);

        let other = headers(&[("origin", "http://evil.example")]);
        assert_eq!(policy.check(&Method::GET, &path(), &other), CorsCheck::RejectedOrigin);
    }

    #[test]
    fn test_is_same_origin() {
        let origin = HeaderValue::from_static("http://localhost:8080");
        let same = |pairs: &[(&'static str, &str)]| is_same_origin(&origin, &path(), &headers(pairs));
        assert!(same(&[("host", "localhost:8080")]));
        assert!(same(&[("host", "LOCALHOST:8080")]));
        assert!(!same(&[("host", "localhost:3000")]));
        assert!(!same(&[]));

        let default_port = HeaderValue::from_static("http://example.com");
        let same = |pairs: &[(&'static str, &str)]| {
            is_same_origin(&default_port, &path(), &headers(pairs))
        };
        assert!(same(&[("host", "example.com")]));
        assert!(same(&[("host", "example.com:80")]));
        assert!(!same(&[("host", "example.com:8080")]));

        let ipv6 = HeaderValue::from_static("http://[::1]:8080");
        assert!(is_same_origin(&ipv6, &path(), &headers(&[("host", "[::1]:8080")])));

        let null = HeaderValue::from_static("null");
        assert!(!is_same_origin(&null, &path(), &headers(&[("host", "localhost:8080")])));
    }

    #[test]
    fn test_is_same_origin_falls_back_to_uri_authority() {
        let origin = HeaderValue::from_static("http://localhost:8080");
        let absolute = Uri::from_static("http://localhost:8080/api/students");

        assert!(is_same_origin(&origin, &absolute, &HeaderMap::new()));
        assert!(!is_same_origin(
            &origin,
            &Uri::from_static("http://localhost:3000/api/students"),
            &HeaderMap::new()
        ));
        assert!(!is_same_origin(&origin, &path(), &HeaderMap::new()));

        // Host wins over the request target
        assert!(!is_same_origin(
            &origin,
            &absolute,
            &headers(&[("host", "example.com")])
        ));
    }

    #[test]
    fn test_strip_cors_response_headers() {
        let mut response_headers = headers(&[
            ("access-control-allow-origin", "*"),
            ("access-control-allow-methods", "GET"),
            ("content-type", "application/json"),
        ]);
        strip_cors_response_headers(&mut response_headers);
        assert_eq!(response_headers.len(), 1);
        assert!(response_headers.contains_key("content-type"));
    }
}
