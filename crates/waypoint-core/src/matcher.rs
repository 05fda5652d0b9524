//! Match results.
//!
//! Resolving a location yields either a full chain of matched routes or a
//! partial chain together with the depth of the error boundary that must
//! render the not-found state.

use crate::route::RouteId;
use serde::Serialize;
use std::collections::BTreeMap;

/// Path parameters bound by a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    /// Get a parameter value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no parameters are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }
}

/// One route in a matched chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedRoute {
    /// Route identifier.
    pub route_id: RouteId,
    /// Full pattern of the route.
    pub pattern: String,
    /// Portion of the pathname matched up to and including this route.
    pub pathname: String,
    /// Parameters bound up to and including this route.
    pub params: Params,
    #[serde(skip)]
    pub(crate) index: usize,
}

/// Outcome of resolving a location against the route tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// A leaf-to-root chain matched the whole pathname.
    Matched {
        /// Matched routes, root first.
        chain: Vec<MatchedRoute>,
        /// Parameters bound by the leaf.
        params: Params,
    },
    /// Nothing matched the whole pathname.
    NotFound {
        /// Deepest partially matched chain, cut at the boundary.
        chain: Vec<MatchedRoute>,
        /// Depth in `chain` of the route whose error element renders.
        boundary: usize,
        /// The unmatched pathname.
        pathname: String,
    },
}

impl Resolution {
    /// Get the matched chain (partial for not-found).
    #[must_use]
    pub fn chain(&self) -> &[MatchedRoute] {
        match self {
            Self::Matched { chain, .. } | Self::NotFound { chain, .. } => chain,
        }
    }

    /// Get the bound parameters of the deepest route.
    #[must_use]
    pub fn params(&self) -> Params {
        match self {
            Self::Matched { params, .. } => params.clone(),
            Self::NotFound { chain, .. } => chain
                .last()
                .map(|m| m.params.clone())
                .unwrap_or_default(),
        }
    }

    /// Check if the location was not found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Routes whose elements render, root first.
    ///
    /// For not-found resolutions the boundary route renders its error
    /// element instead, so it is excluded.
    #[must_use]
    pub fn rendered(&self) -> &[MatchedRoute] {
        match self {
            Self::Matched { chain, .. } => chain,
            Self::NotFound {
                chain, boundary, ..
            } => &chain[..(*boundary).min(chain.len())],
        }
    }

    /// Id of the deepest matched route.
    #[must_use]
    pub fn leaf_id(&self) -> Option<&RouteId> {
        self.chain().last().map(|m| &m.route_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched(id: &str, index: usize) -> MatchedRoute {
        MatchedRoute {
            route_id: RouteId::from(id),
            pattern: "/".to_string(),
            pathname: "/".to_string(),
            params: Params::default(),
            index,
        }
    }

    #[test]
    fn test_params_access() {
        let mut params = Params::default();
        assert!(params.is_empty());
        params.insert("userId", "2");
        assert_eq!(params.get("userId"), Some("2"));
        assert_eq!(params.len(), 1);
        assert_eq!(params.iter().collect::<Vec<_>>(), vec![("userId", "2")]);
    }

    #[test]
    fn test_rendered_excludes_boundary() {
        let resolution = Resolution::NotFound {
            chain: vec![matched("root", 0), matched("user", 1)],
            boundary: 1,
            pathname: "/users/5/x".to_string(),
        };
        assert!(resolution.is_not_found());
        let ids: Vec<_> = resolution.rendered().iter().map(|m| &m.route_id).collect();
        assert_eq!(ids, vec![&RouteId::from("root")]);
        assert_eq!(resolution.leaf_id(), Some(&RouteId::from("user")));
    }

    #[test]
    fn test_resolution_serializes_with_status() {
        let resolution = Resolution::Matched {
            chain: vec![matched("root", 0)],
            params: Params::default(),
        };
        let json = serde_json::to_value(&resolution).unwrap();
        assert_eq!(json["status"], "matched");
        assert_eq!(json["chain"][0]["route_id"], "root");
    }
}
