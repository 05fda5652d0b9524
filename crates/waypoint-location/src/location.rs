//! Application locations.
//!
//! A location is the in-app part of a URL: pathname, search and hash.
//! Relative hrefs are resolved with URL semantics against a base pathname
//! that is treated as a directory, so `followers` resolved from
//! `/users/2` becomes `/users/2/followers`.

use crate::path;
use crate::query::QueryParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Synthetic origin used to resolve hrefs.
const ORIGIN: &str = "http://waypoint.local/";

/// Location errors.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The href was empty.
    #[error("Empty href")]
    Empty,

    /// The href could not be parsed.
    #[error("Invalid href {href:?}: {source}")]
    Invalid {
        /// The offending href.
        href: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },

    /// The href points outside the application.
    #[error("Href leaves the application: {0}")]
    External(String),
}

/// A location inside the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pathname: String,
    search: QueryParams,
    hash: Option<String>,
}

impl Location {
    /// The root location `/`.
    #[must_use]
    pub fn root() -> Self {
        Self {
            pathname: "/".to_string(),
            search: QueryParams::new(),
            hash: None,
        }
    }

    /// Parse an href, resolving relative hrefs against `/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the href is empty, malformed, or external.
    pub fn parse(href: &str) -> Result<Self, LocationError> {
        Self::resolve("/", href)
    }

    /// Resolve an href against a base pathname.
    ///
    /// Absolute hrefs (`/about`) ignore the base. Relative hrefs, `.` and
    /// `..` segments, search-only (`?a=1`) and hash-only (`#top`) hrefs
    /// resolve against `base` as if it ended with a slash.
    ///
    /// # Errors
    ///
    /// Returns an error if the href is empty, malformed, or points at a
    /// different origin.
    pub fn resolve(base: &str, to: &str) -> Result<Self, LocationError> {
        let to = to.trim();
        if to.is_empty() {
            return Err(LocationError::Empty);
        }

        let invalid = |source| LocationError::Invalid {
            href: to.to_string(),
            source,
        };

        let origin = Url::parse(ORIGIN).map_err(invalid)?;
        let mut directory = path::normalize(base);
        if !directory.ends_with('/') {
            directory.push('/');
        }
        let base_url = origin.join(&directory).map_err(invalid)?;
        let url = base_url.join(to).map_err(invalid)?;

        if url.origin() != origin.origin() {
            return Err(LocationError::External(to.to_string()));
        }

        Ok(Self::from_url(&url))
    }

    fn from_url(url: &Url) -> Self {
        Self {
            pathname: path::normalize(url.path()),
            search: url.query().map(QueryParams::parse).unwrap_or_default(),
            hash: url
                .fragment()
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        }
    }

    /// Get the pathname (always starts with `/`, never ends with one unless root).
    #[must_use]
    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// Get the query parameters.
    #[must_use]
    pub fn search(&self) -> &QueryParams {
        &self.search
    }

    /// Get the hash without the leading `#`.
    #[must_use]
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// Same pathname with new query parameters and no hash.
    #[must_use]
    pub fn with_search(&self, search: QueryParams) -> Self {
        Self {
            pathname: self.pathname.clone(),
            search,
            hash: None,
        }
    }

    /// Full in-app href.
    #[must_use]
    pub fn href(&self) -> String {
        self.to_string()
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pathname)?;
        if !self.search.is_empty() {
            write!(f, "?{}", self.search)?;
        }
        if let Some(hash) = &self.hash {
            write!(f, "#{hash}")?;
        }
        Ok(())
    }
}
