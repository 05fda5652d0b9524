//! Error types for Waypoint.

use thiserror::Error;
use waypoint_location::LocationError;

/// Router errors.
///
/// These are configuration and navigation failures. Content failures raised
/// while rendering a page are [`RenderError`]s and are handled by error
/// boundaries instead.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The router was built without any routes.
    #[error("Router has no routes")]
    Empty,

    /// A route path could not be parsed.
    #[error("Invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The same parameter name appears twice in one route chain.
    #[error("Duplicate path parameter: {0}")]
    DuplicateParam(String),

    /// An absolute child path does not start with its parent's path.
    #[error("Absolute child path {child:?} is not nested under {parent:?}")]
    ChildOutsideParent {
        /// Parent's full path.
        parent: String,
        /// Child's absolute path.
        child: String,
    },

    /// An index route declared children.
    #[error("Index route {0:?} cannot have children")]
    IndexWithChildren(String),

    /// Two routes share an id.
    #[error("Duplicate route id: {0}")]
    DuplicateRouteId(String),

    /// A top-level route has no error element to fall back on.
    #[error("Top-level route {0:?} has no error element")]
    MissingRootBoundary(String),

    /// The navigation target could not be resolved.
    #[error(transparent)]
    Location(#[from] LocationError),

    /// No link or button with the given label is on screen.
    #[error("No link or button labelled {0:?}")]
    NoSuchControl(String),

    /// The browser receiving navigator commands is gone.
    #[error("Navigator closed")]
    NavigatorClosed,
}

/// Errors raised by page components while rendering.
///
/// A render error travels up the matched route chain until a route with an
/// error element handles it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The location, or something it refers to, does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A nested route expected outlet context that its parent did not provide.
    #[error("Missing outlet context: expected {expected}")]
    MissingContext {
        /// Type name of the expected context.
        expected: &'static str,
    },

    /// Any other component failure.
    #[error("{0}")]
    Component(String),
}

impl RenderError {
    /// Create a not-found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Create a component error.
    #[must_use]
    pub fn component(message: impl Into<String>) -> Self {
        Self::Component(message.into())
    }

    /// Stable name of the error kind, for logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::MissingContext { .. } => "missing_context",
            Self::Component(_) => "component",
        }
    }
}
