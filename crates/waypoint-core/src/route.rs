//! Declarative route definitions.
//!
//! Routes form a tree. Child paths are relative to their parent unless they
//! start with `/`, in which case they must repeat the parent's full path.

use crate::effect::{MountContext, MountGuard};
use crate::error::RenderError;
use crate::outlet::RenderContext;
use crate::view::View;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A page component: renders a view for the current match.
pub type Component = Arc<dyn Fn(&RenderContext<'_>) -> Result<View, RenderError> + Send + Sync>;

/// Hook run when a route enters the active chain.
///
/// The returned guard lives until the route leaves the chain.
pub type MountHook = Arc<dyn Fn(&MountContext<'_>) -> MountGuard + Send + Sync>;

/// Stable route identifier.
///
/// Ids default to the route's position in the tree (`0`, `0-1`, `0-1-0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RouteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RouteId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A route definition.
#[derive(Default)]
pub struct Route {
    pub(crate) id: Option<String>,
    pub(crate) path: Option<String>,
    pub(crate) index: bool,
    pub(crate) case_sensitive: bool,
    pub(crate) element: Option<Component>,
    pub(crate) error_element: Option<Component>,
    pub(crate) children: Vec<Route>,
    pub(crate) on_mount: Option<MountHook>,
}

impl Route {
    /// Create a route for a path.
    ///
    /// An empty path matches wherever the parent matches.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Create an index route, rendered when the parent matches exactly.
    #[must_use]
    pub fn index() -> Self {
        Self {
            index: true,
            ..Self::default()
        }
    }

    /// Set an explicit id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Compare static segments case-sensitively.
    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Set the page component.
    #[must_use]
    pub fn element<F>(mut self, component: F) -> Self
    where
        F: Fn(&RenderContext<'_>) -> Result<View, RenderError> + Send + Sync + 'static,
    {
        self.element = Some(Arc::new(component));
        self
    }

    /// Set the component rendered when this route or a descendant fails.
    #[must_use]
    pub fn error_element<F>(mut self, component: F) -> Self
    where
        F: Fn(&RenderContext<'_>) -> Result<View, RenderError> + Send + Sync + 'static,
    {
        self.error_element = Some(Arc::new(component));
        self
    }

    /// Add a child route.
    #[must_use]
    pub fn child(mut self, route: Route) -> Self {
        self.children.push(route);
        self
    }

    /// Add several child routes.
    #[must_use]
    pub fn children(mut self, routes: impl IntoIterator<Item = Route>) -> Self {
        self.children.extend(routes);
        self
    }

    /// Run a hook whenever this route enters the active chain.
    #[must_use]
    pub fn on_mount<F>(mut self, hook: F) -> Self
    where
        F: Fn(&MountContext<'_>) -> MountGuard + Send + Sync + 'static,
    {
        self.on_mount = Some(Arc::new(hook));
        self
    }

    pub(crate) fn describe(&self) -> String {
        match (&self.id, &self.path) {
            (Some(id), _) => id.clone(),
            (None, Some(path)) => path.clone(),
            (None, None) => "<index>".to_string(),
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("index", &self.index)
            .field("case_sensitive", &self.case_sensitive)
            .field("element", &self.element.is_some())
            .field("error_element", &self.error_element.is_some())
            .field("on_mount", &self.on_mount.is_some())
            .field("children", &self.children)
            .finish()
    }
}
