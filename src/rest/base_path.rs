use crate::error::{AppError, AppResult};
use std::fmt;

/// Path prefix the repository resources are mounted under.
///
/// Stored without a trailing slash. The root prefix (`/`) is kept as an empty
/// string so that joining never produces `//`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePath(String);

impl BasePath {
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim();
        if !trimmed.starts_with('/') {
            return Err(AppError::Configuration(format!(
                "base path '{}' must start with '/'",
                raw
            )));
        }

        let normalized = trimmed.trim_end_matches('/');
        if normalized.split('/').skip(1).any(|segment| segment.is_empty()) {
            return Err(AppError::Configuration(format!(
                "base path '{}' contains an empty segment",
                raw
            )));
        }

        if normalized.contains(['{', '}', '*', '?', '#']) {
            return Err(AppError::Configuration(format!(
                "base path '{}' must be a literal path",
                raw
            )));
        }

        Ok(Self(normalized.to_string()))
    }

    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        if self.is_root() {
            "/"
        } else {
            &self.0
        }
    }

    /// Whether `path` is the prefix itself or lies below it.
    pub fn contains(&self, path: &str) -> bool {
        if self.is_root() {
            return true;
        }

        match path.strip_prefix(self.0.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Prefix a resource-relative path such as `/students/1`.
    pub fn join(&self, suffix: &str) -> String {
        let suffix = suffix.trim_start_matches('/');
        format!("{}/{}", self.0, suffix)
    }
}

impl fmt::Display for BasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_trailing_slash() {
        let base = BasePath::parse("/api/").unwrap();
        assert_eq!(base.as_str(), "/api");
    }

    #[test]
    fn test_parse_root() {
        let base = BasePath::parse("/").unwrap();
        assert!(base.is_root());
        assert_eq!(base, BasePath::root());
        assert_eq!(base.as_str(), "/");
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(BasePath::parse("api").is_err());
        assert!(BasePath::parse("").is_err());
        assert!(BasePath::parse("/api//v1").is_err());
        assert!(BasePath::parse("/api/{version}").is_err());
        assert!(BasePath::parse("/api/**").is_err());
    }

    #[test]
    fn test_contains() {
        let base = BasePath::parse("/api").unwrap();
        assert!(base.contains("/api"));
        assert!(base.contains("/api/"));
        assert!(base.contains("/api/students"));
        assert!(base.contains("/api/students/7"));
        assert!(!base.contains("/apix"));
        assert!(!base.contains("/apis/students"));
        assert!(!base.contains("/students"));
        assert!(!base.contains("/"));
    }

    #[test]
    fn test_root_contains_everything() {
        let base = BasePath::root();
        assert!(base.contains("/"));
        assert!(base.contains("/students"));
    }

    #[test]
    fn test_join() {
        let base = BasePath::parse("/api").unwrap();
        assert_eq!(base.join("/students/1"), "/api/students/1");
        assert_eq!(base.join("students"), "/api/students");
        assert_eq!(BasePath::root().join("/students"), "/students");
    }
}
