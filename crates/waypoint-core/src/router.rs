//! Route tree compilation and resolution.
//!
//! The router flattens the route tree into branches (root-to-node chains),
//! ranks them by specificity and returns the first branch whose full
//! pattern consumes the whole pathname. When nothing matches, it walks the
//! tree again to find the deepest partial chain and the nearest error
//! boundary on it.

use crate::error::{RenderError, RouterError};
use crate::matcher::{MatchedRoute, Resolution};
use crate::outlet::{RenderRequest, Rendered};
use crate::pattern::Pattern;
use crate::route::{Component, MountHook, Route, RouteId};
use crate::view::View;
use std::cell::RefCell;
use std::collections::HashSet;
use tracing::{debug, error, info};
use waypoint_location::{path, Location};

/// A compiled route.
pub(crate) struct RouteEntry {
    pub(crate) id: RouteId,
    pub(crate) pattern: Pattern,
    pub(crate) index: bool,
    pub(crate) element: Option<Component>,
    pub(crate) error_element: Option<Component>,
    pub(crate) on_mount: Option<MountHook>,
    pub(crate) children: Vec<usize>,
}

/// A root-to-node chain, with the node's score.
struct Branch {
    chain: Vec<usize>,
    score: i32,
}

/// The route table.
///
/// Built once from a [`Route`] tree; resolving and rendering never mutate it.
pub struct Router {
    entries: Vec<RouteEntry>,
    roots: Vec<usize>,
    branches: Vec<Branch>,
}

struct Builder {
    entries: Vec<RouteEntry>,
    ids: HashSet<String>,
}

impl Builder {
    fn add(
        &mut self,
        route: Route,
        parent: Option<&Pattern>,
        default_id: String,
    ) -> Result<usize, RouterError> {
        let raw = route.path.clone().unwrap_or_default();
        let own = Pattern::parse(&raw, route.case_sensitive)?;

        let pattern = match parent {
            Some(parent) if raw.starts_with('/') => {
                if !own.starts_with(parent) {
                    return Err(RouterError::ChildOutsideParent {
                        parent: parent.to_string(),
                        child: raw,
                    });
                }
                own
            }
            Some(parent) => parent.join(&own)?,
            None => own,
        };

        if route.index && !route.children.is_empty() {
            return Err(RouterError::IndexWithChildren(route.describe()));
        }

        let id = route.id.unwrap_or(default_id);
        if !self.ids.insert(id.clone()) {
            return Err(RouterError::DuplicateRouteId(id));
        }

        let index = self.entries.len();
        self.entries.push(RouteEntry {
            id: RouteId::from(id.clone()),
            pattern: pattern.clone(),
            index: route.index,
            element: route.element,
            error_element: route.error_element,
            on_mount: route.on_mount,
            children: Vec::new(),
        });

        for (i, child) in route.children.into_iter().enumerate() {
            let child_index = self.add(child, Some(&pattern), format!("{id}-{i}"))?;
            self.entries[index].children.push(child_index);
        }

        Ok(index)
    }
}

impl Router {
    /// Compile a route tree.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no routes, a pattern is invalid, ids
    /// collide, or a top-level route lacks an error element.
    pub fn new(routes: Vec<Route>) -> Result<Self, RouterError> {
        if routes.is_empty() {
            return Err(RouterError::Empty);
        }

        let mut builder = Builder {
            entries: Vec::new(),
            ids: HashSet::new(),
        };
        let mut roots = Vec::with_capacity(routes.len());
        for (i, route) in routes.into_iter().enumerate() {
            if route.error_element.is_none() {
                return Err(RouterError::MissingRootBoundary(route.describe()));
            }
            roots.push(builder.add(route, None, i.to_string())?);
        }

        let mut router = Self {
            entries: builder.entries,
            roots,
            branches: Vec::new(),
        };

        let mut branches = Vec::new();
        let mut chain = Vec::new();
        for &root in &router.roots {
            router.flatten(root, &mut chain, &mut branches);
        }
        // Stable: equal scores keep declaration order, children first.
        branches.sort_by(|a, b| b.score.cmp(&a.score));
        router.branches = branches;

        info!(
            routes = router.entries.len(),
            branches = router.branches.len(),
            "Router built"
        );
        Ok(router)
    }

    fn flatten(&self, index: usize, chain: &mut Vec<usize>, out: &mut Vec<Branch>) {
        chain.push(index);
        let entry = &self.entries[index];
        for &child in &entry.children {
            self.flatten(child, chain, out);
        }
        out.push(Branch {
            chain: chain.clone(),
            score: entry.pattern.score(entry.index),
        });
        chain.pop();
    }

    pub(crate) fn entry(&self, index: usize) -> &RouteEntry {
        &self.entries[index]
    }

    /// Get router statistics.
    #[must_use]
    pub fn stats(&self) -> RouterStats {
        RouterStats {
            route_count: self.entries.len(),
            branch_count: self.branches.len(),
            boundary_count: self
                .entries
                .iter()
                .filter(|e| e.error_element.is_some())
                .count(),
        }
    }

    /// Every route's id and full pattern, in declaration order.
    #[must_use]
    pub fn patterns(&self) -> Vec<(RouteId, String)> {
        self.entries
            .iter()
            .map(|e| (e.id.clone(), e.pattern.to_string()))
            .collect()
    }

    /// Resolve a location against the route tree.
    #[must_use]
    pub fn resolve(&self, location: &Location) -> Resolution {
        let raw: Vec<&str> = path::segments(location.pathname()).collect();
        let decoded: Vec<String> = raw.iter().map(|s| path::decode_segment(s)).collect();

        for branch in &self.branches {
            let Some(&leaf) = branch.chain.last() else {
                continue;
            };
            if let Some(params) = self.entries[leaf].pattern.match_full(&decoded) {
                let Some(chain) = branch
                    .chain
                    .iter()
                    .map(|&i| self.match_entry(i, &raw, &decoded))
                    .collect::<Option<Vec<MatchedRoute>>>()
                else {
                    continue;
                };
                debug!(
                    path = %location.pathname(),
                    route = %self.entries[leaf].id,
                    depth = chain.len(),
                    "Matched route"
                );
                return Resolution::Matched { chain, params };
            }
        }

        let mut chain = self.partial_chain(&raw, &decoded);
        if chain.is_empty() {
            // Nothing shares a prefix with the path: the first root handles it.
            let root = self.roots[0];
            chain.push(MatchedRoute {
                route_id: self.entries[root].id.clone(),
                pattern: self.entries[root].pattern.to_string(),
                pathname: "/".to_string(),
                params: Default::default(),
                index: root,
            });
        }

        let boundary = chain
            .iter()
            .rposition(|m| self.entries[m.index].error_element.is_some())
            .unwrap_or(0);
        chain.truncate(boundary + 1);

        debug!(
            path = %location.pathname(),
            boundary = %chain[boundary].route_id,
            "No route matched"
        );
        Resolution::NotFound {
            chain,
            boundary,
            pathname: location.pathname().to_string(),
        }
    }

    fn match_entry(&self, index: usize, raw: &[&str], decoded: &[String]) -> Option<MatchedRoute> {
        let entry = &self.entries[index];
        let (params, consumed) = entry.pattern.match_prefix(decoded)?;
        Some(MatchedRoute {
            route_id: entry.id.clone(),
            pattern: entry.pattern.to_string(),
            pathname: path::from_segments(&raw[..consumed]),
            params,
            index,
        })
    }

    /// Deepest chain whose patterns match a prefix of the path.
    ///
    /// A child joins the chain only if it consumes more of the path than
    /// its parent or has children of its own; otherwise leaf routes such as
    /// `""` would claim every unmatched path.
    fn partial_chain(&self, raw: &[&str], decoded: &[String]) -> Vec<MatchedRoute> {
        let mut chain: Vec<MatchedRoute> = Vec::new();
        let mut candidates: &[usize] = &self.roots;
        let mut consumed = 0usize;

        loop {
            let mut best: Option<(i32, MatchedRoute, usize)> = None;
            for &candidate in candidates {
                let entry = &self.entries[candidate];
                let Some((_, used)) = entry.pattern.match_prefix(decoded) else {
                    continue;
                };
                let progressed = chain.is_empty() || used > consumed || !entry.children.is_empty();
                if !progressed {
                    continue;
                }
                let score = entry.pattern.score(entry.index);
                if best.as_ref().map_or(true, |(s, _, _)| score > *s) {
                    if let Some(matched) = self.match_entry(candidate, raw, decoded) {
                        best = Some((score, matched, used));
                    }
                }
            }

            match best {
                Some((_, matched, used)) => {
                    candidates = &self.entries[matched.index].children;
                    consumed = used;
                    chain.push(matched);
                }
                None => break,
            }
        }

        chain
    }

    /// Render a resolution.
    ///
    /// Failures are handled by the nearest error boundary. If even the root
    /// boundary fails, a minimal built-in error view is returned.
    #[must_use]
    pub fn render(&self, location: &Location, resolution: &Resolution) -> Rendered {
        let (chain, injected) = match resolution {
            Resolution::Matched { chain, .. } => (chain.as_slice(), None),
            Resolution::NotFound {
                chain,
                boundary,
                pathname,
            } => (
                chain.as_slice(),
                Some((*boundary, RenderError::not_found(pathname.clone()))),
            ),
        };

        let request = RenderRequest {
            router: self,
            location,
            chain,
            injected,
            handled: RefCell::new(Vec::new()),
        };

        let view = match request.render_level(0, None) {
            Ok(view) => view,
            Err(err) => {
                error!(path = %location, error = %err, "Unhandled render error");
                View::element(
                    "div",
                    vec![
                        View::heading("Unexpected Application Error"),
                        View::paragraph(err.to_string()),
                    ],
                )
            }
        };

        Rendered {
            view,
            handled: request.handled.into_inner(),
        }
    }
}

/// Router statistics.
#[derive(Debug, Clone)]
pub struct RouterStats {
    /// Number of routes.
    pub route_count: usize,
    /// Number of ranked branches.
    pub branch_count: usize,
    /// Number of routes with an error element.
    pub boundary_count: usize,
}
