use crate::error::{AppError, AppResult};
use regex::Regex;
use std::fmt;

#[derive(Debug, Clone)]
enum Segment {
    /// `**`: zero or more whole segments
    Recursive,
    Literal(String),
    /// A segment containing `*` or `?`
    Wildcard(Regex),
}

impl Segment {
    fn parse(raw: &str) -> AppResult<Self> {
        if raw == "**" {
            return Ok(Segment::Recursive);
        }

        if !raw.contains(['*', '?']) {
            return Ok(Segment::Literal(raw.to_string()));
        }

        let mut expr = String::from("^");
        for c in raw.chars() {
            match c {
                '*' => expr.push_str("[^/]*"),
                '?' => expr.push_str("[^/]"),
                other => expr.push_str(&regex::escape(&other.to_string())),
            }
        }
        expr.push('$');

        Regex::new(&expr).map(Segment::Wildcard).map_err(|e| {
            AppError::Configuration(format!("invalid path pattern segment '{}': {}", raw, e))
        })
    }

    fn matches(&self, part: &str) -> bool {
        match self {
            Segment::Recursive => true,
            Segment::Literal(literal) => literal == part,
            Segment::Wildcard(regex) => regex.is_match(part),
        }
    }
}

/// Ant-style path pattern (`/**`, `/api/*`, `/api/students/**`).
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> AppResult<Self> {
        if !raw.starts_with('/') {
            return Err(AppError::Configuration(format!(
                "path pattern '{}' must start with '/'",
                raw
            )));
        }

        let segments = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match_segments(&self.segments, &parts)
    }
}

fn match_segments(segments: &[Segment], parts: &[&str]) -> bool {
    match segments.split_first() {
        None => parts.is_empty(),
        Some((Segment::Recursive, rest)) => {
            (0..=parts.len()).any(|skip| match_segments(rest, &parts[skip..]))
        }
        Some((segment, rest)) => match parts.split_first() {
            Some((part, tail)) => segment.matches(part) && match_segments(rest, tail),
            None => false,
        },
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
