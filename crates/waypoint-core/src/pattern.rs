//! Route path patterns.
//!
//! A pattern is a sequence of segments: static text, `:name` parameters,
//! and an optional trailing `*` splat. Patterns are matched against
//! percent-decoded URL segments.

use crate::error::RouterError;
use crate::matcher::Params;
use std::collections::HashSet;
use std::fmt;
use waypoint_location::path;

const STATIC_SEGMENT_VALUE: i32 = 10;
const DYNAMIC_SEGMENT_VALUE: i32 = 3;
const EMPTY_SEGMENT_VALUE: i32 = 1;
const INDEX_ROUTE_VALUE: i32 = 2;
const SPLAT_PENALTY: i32 = -2;

/// Key under which a splat binds the rest of the path.
pub const SPLAT_KEY: &str = "*";

/// A single pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text.
    Static {
        /// Decoded segment text.
        value: String,
        /// Whether comparison is case-sensitive.
        case_sensitive: bool,
    },
    /// `:name` parameter.
    Param(String),
    /// Trailing `*`.
    Splat,
}

impl Segment {
    /// Check if every URL segment `other` accepts is also accepted by `self`.
    fn covers(&self, other: &Segment) -> bool {
        match (self, other) {
            (
                Segment::Static {
                    value: a,
                    case_sensitive: true,
                },
                Segment::Static {
                    value: b,
                    case_sensitive: strict,
                },
            ) => *strict && a == b,
            (
                Segment::Static {
                    value: a,
                    case_sensitive: false,
                },
                Segment::Static { value: b, .. },
            ) => a.eq_ignore_ascii_case(b),
            (Segment::Param(a), Segment::Param(b)) => a == b,
            (Segment::Splat, Segment::Splat) => true,
            _ => false,
        }
    }
}

/// A compiled route pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    segments: Vec<Segment>,
}

fn invalid(pattern: &str, reason: &'static str) -> RouterError {
    RouterError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    }
}

impl Pattern {
    /// Parse a route path.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed parameters, a splat that is not the
    /// last segment, or a repeated parameter name.
    pub fn parse(raw: &str, case_sensitive: bool) -> Result<Self, RouterError> {
        let parts: Vec<&str> = path::segments(raw).collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            let segment = if *part == SPLAT_KEY {
                if i + 1 != parts.len() {
                    return Err(invalid(raw, "splat must be the last segment"));
                }
                Segment::Splat
            } else if let Some(name) = part.strip_prefix(':') {
                let valid = !name.is_empty()
                    && name
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
                if !valid {
                    return Err(invalid(raw, "parameter names must be alphanumeric"));
                }
                Segment::Param(name.to_string())
            } else if part.contains('*') {
                return Err(invalid(raw, "splat must be a whole segment"));
            } else {
                Segment::Static {
                    value: path::decode_segment(part),
                    case_sensitive,
                }
            };
            segments.push(segment);
        }

        let pattern = Self { segments };
        pattern.check_params()?;
        Ok(pattern)
    }

    fn check_params(&self) -> Result<(), RouterError> {
        let mut seen = HashSet::new();
        for segment in &self.segments {
            if let Segment::Param(name) = segment {
                if !seen.insert(name.as_str()) {
                    return Err(RouterError::DuplicateParam(name.clone()));
                }
            }
        }
        Ok(())
    }

    /// Append a child pattern to this one.
    ///
    /// # Errors
    ///
    /// Returns an error if this pattern ends in a splat or the combined
    /// pattern repeats a parameter name.
    pub fn join(&self, child: &Pattern) -> Result<Pattern, RouterError> {
        if self.has_splat() && !child.segments.is_empty() {
            return Err(invalid(
                &format!("{self}{child}"),
                "children cannot follow a splat",
            ));
        }
        let mut segments = self.segments.clone();
        segments.extend(child.segments.iter().cloned());
        let joined = Self { segments };
        joined.check_params()?;
        Ok(joined)
    }

    /// Check if this pattern begins with every segment of `prefix`, so that
    /// any path it matches also matches `prefix`.
    #[must_use]
    pub fn starts_with(&self, prefix: &Pattern) -> bool {
        prefix.segments.len() <= self.segments.len()
            && prefix
                .segments
                .iter()
                .zip(&self.segments)
                .all(|(a, b)| a.covers(b))
    }

    /// Get the segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Check if the pattern ends in a splat.
    #[must_use]
    pub fn has_splat(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Splat))
    }

    /// Specificity score; higher scores are tried first.
    #[must_use]
    pub fn score(&self, index: bool) -> i32 {
        // The leading empty segment of "/..." counts as one segment.
        let mut score = self.segments.len() as i32 + 1 + EMPTY_SEGMENT_VALUE;
        if self.has_splat() {
            score += SPLAT_PENALTY;
        }
        if index {
            score += INDEX_ROUTE_VALUE;
        }
        for segment in &self.segments {
            score += match segment {
                Segment::Static { .. } => STATIC_SEGMENT_VALUE,
                Segment::Param(_) => DYNAMIC_SEGMENT_VALUE,
                Segment::Splat => 0,
            };
        }
        score
    }

    /// Match the leading URL segments.
    ///
    /// Returns the bound parameters and how many URL segments were consumed.
    #[must_use]
    pub fn match_prefix(&self, url: &[String]) -> Option<(Params, usize)> {
        let mut params = Params::default();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Splat => {
                    params.insert(SPLAT_KEY, url[i.min(url.len())..].join("/"));
                    return Some((params, url.len()));
                }
                Segment::Static {
                    value,
                    case_sensitive,
                } => {
                    let part = url.get(i)?;
                    let equal = if *case_sensitive {
                        part == value
                    } else {
                        part.eq_ignore_ascii_case(value)
                    };
                    if !equal {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let part = url.get(i)?;
                    params.insert(name.as_str(), part.as_str());
                }
            }
        }
        Some((params, self.segments.len()))
    }

    /// Match the whole URL.
    #[must_use]
    pub fn match_full(&self, url: &[String]) -> Option<Params> {
        let (params, consumed) = self.match_prefix(url)?;
        (consumed == url.len()).then_some(params)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Static { value, .. } => write!(f, "/{value}")?,
                Segment::Param(name) => write!(f, "/:{name}")?,
                Segment::Splat => f.write_str("/*")?,
            }
        }
        Ok(())
    }
}
