//! Nested outlet rendering.
//!
//! Rendering walks the matched chain from the root. Each component decides
//! where its child appears by calling [`RenderContext::outlet`] or
//! [`RenderContext::outlet_with`], the latter handing a typed context value
//! to the child. A failure in a component travels up until a route with an
//! error element renders in its place.

use crate::error::RenderError;
use crate::matcher::{MatchedRoute, Params};
use crate::route::RouteId;
use crate::router::Router;
use crate::view::{Action, View};
use serde::Serialize;
use std::any::{type_name, Any};
use std::cell::RefCell;
use tracing::{trace, warn};
use waypoint_location::{Location, QueryParams};

/// A render error caught by an error boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandledError {
    /// Route whose error element rendered.
    pub route_id: RouteId,
    /// Error kind, see [`RenderError::kind`].
    pub kind: &'static str,
    /// Error message.
    pub message: String,
}

/// Result of rendering a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    /// The rendered view.
    pub view: View,
    /// Errors handled by boundaries, innermost first.
    pub handled: Vec<HandledError>,
}

/// State shared by every level of one render pass.
pub(crate) struct RenderRequest<'a> {
    pub(crate) router: &'a Router,
    pub(crate) location: &'a Location,
    pub(crate) chain: &'a [MatchedRoute],
    /// Error raised at a depth in place of its element.
    pub(crate) injected: Option<(usize, RenderError)>,
    pub(crate) handled: RefCell<Vec<HandledError>>,
}

impl<'a> RenderRequest<'a> {
    pub(crate) fn render_level(
        &self,
        depth: usize,
        context: Option<&dyn Any>,
    ) -> Result<View, RenderError> {
        let Some(matched) = self.chain.get(depth) else {
            return Ok(View::Empty);
        };
        let entry = self.router.entry(matched.index);
        trace!(route = %matched.route_id, depth, "Rendering route");

        let ctx = RenderContext {
            request: self,
            depth,
            matched,
            outlet_context: context,
            error: None,
        };

        let result = match &self.injected {
            Some((at, err)) if *at == depth => Err(err.clone()),
            _ => match &entry.element {
                Some(component) => component(&ctx),
                None => ctx.outlet(),
            },
        };

        let err = match result {
            Ok(view) => return Ok(view),
            Err(err) => err,
        };

        let Some(fallback) = &entry.error_element else {
            return Err(err);
        };

        warn!(
            route = %matched.route_id,
            kind = err.kind(),
            error = %err,
            "Error boundary caught render error"
        );
        self.handled.borrow_mut().push(HandledError {
            route_id: matched.route_id.clone(),
            kind: err.kind(),
            message: err.to_string(),
        });

        let fallback_ctx = RenderContext {
            request: self,
            depth,
            matched,
            outlet_context: context,
            error: Some(&err),
        };
        fallback(&fallback_ctx)
    }
}

/// What a component sees while rendering.
pub struct RenderContext<'a> {
    request: &'a RenderRequest<'a>,
    depth: usize,
    matched: &'a MatchedRoute,
    outlet_context: Option<&'a dyn Any>,
    error: Option<&'a RenderError>,
}

impl<'a> RenderContext<'a> {
    /// Parameters bound up to this route.
    #[must_use]
    pub fn params(&self) -> &'a Params {
        &self.matched.params
    }

    /// Get a single parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.matched.params.get(name)
    }

    /// The location being rendered.
    #[must_use]
    pub fn location(&self) -> &'a Location {
        self.request.location
    }

    /// Query parameters of the location being rendered.
    #[must_use]
    pub fn search_params(&self) -> &'a QueryParams {
        self.request.location.search()
    }

    /// Id of the route being rendered.
    #[must_use]
    pub fn route_id(&self) -> &'a RouteId {
        &self.matched.route_id
    }

    /// Pathname matched up to this route; relative links resolve against it.
    #[must_use]
    pub fn pathname(&self) -> &'a str {
        &self.matched.pathname
    }

    /// Depth of this route in the matched chain (root is 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The error being handled, when rendering an error element.
    #[must_use]
    pub fn error(&self) -> Option<&'a RenderError> {
        self.error
    }

    /// Render the matched child route, without context.
    ///
    /// Returns an empty view when this route is the leaf.
    ///
    /// # Errors
    ///
    /// Returns the child's error if no boundary at or below the child
    /// handled it.
    pub fn outlet(&self) -> Result<View, RenderError> {
        self.request.render_level(self.depth + 1, None)
    }

    /// Render the matched child route, handing it a context value.
    ///
    /// # Errors
    ///
    /// Returns the child's error if no boundary at or below the child
    /// handled it.
    pub fn outlet_with<T: Any>(&self, context: T) -> Result<View, RenderError> {
        self.request
            .render_level(self.depth + 1, Some(&context as &dyn Any))
    }

    /// Context value supplied by the parent route.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingContext`] if the parent supplied no
    /// context or a value of another type.
    pub fn outlet_context<T: Any>(&self) -> Result<&'a T, RenderError> {
        self.outlet_context
            .and_then(|context| context.downcast_ref::<T>())
            .ok_or(RenderError::MissingContext {
                expected: type_name::<T>(),
            })
    }

    /// Resolve an href relative to this route.
    #[must_use]
    pub fn href(&self, to: &str) -> String {
        Location::resolve(self.pathname(), to)
            .map(|location| location.href())
            .unwrap_or_else(|_| to.to_string())
    }

    /// A link to an href relative to this route.
    #[must_use]
    pub fn link(&self, to: &str, label: impl Into<String>) -> View {
        View::Link {
            href: self.href(to),
            label: label.into(),
        }
    }

    /// A button that navigates to an href relative to this route.
    #[must_use]
    pub fn button(&self, label: impl Into<String>, to: &str) -> View {
        View::Button {
            label: label.into(),
            action: Action::Navigate {
                to: self.href(to),
                replace: false,
            },
        }
    }
}
