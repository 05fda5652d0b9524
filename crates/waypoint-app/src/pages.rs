//! Page components.

use crate::directory::UserDirectory;
use std::time::Duration;
use tenvis_waypoint_core::{Deferred, MountContext, MountGuard, RenderContext, RenderError, View};
use tracing::{debug, warn};
use waypoint_location::QueryParams;

/// Context the User page hands to its nested routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowerContext {
    pub name_of_user: String,
}

/// Query parameters Home writes after its delay.
pub fn home_search_params() -> QueryParams {
    [("day", "today"), ("tomorrow", "123")].into_iter().collect()
}

/// The user list.
pub fn home(
    directory: UserDirectory,
) -> impl Fn(&RenderContext<'_>) -> Result<View, RenderError> + Send + Sync + 'static {
    move |ctx| {
        let items = directory
            .users()
            .iter()
            .map(|user| ctx.link(&format!("/users/{}", user.id), user.name.clone()))
            .collect();
        Ok(View::element(
            "div",
            vec![View::heading("Users"), View::list(items)],
        ))
    }
}

/// Mount hook for Home: rewrite the query parameters once after `delay`.
///
/// The task belongs to the returned guard, so leaving Home cancels it.
pub fn schedule_search_update(
    delay: Duration,
) -> impl Fn(&MountContext<'_>) -> MountGuard + Send + Sync + 'static {
    move |mount| {
        let navigator = mount.navigator();
        let route = mount.route_id().clone();
        MountGuard::from(Deferred::after(delay, async move {
            debug!(%route, "Applying deferred search update");
            if let Err(err) = navigator.set_search_params(home_search_params()) {
                warn!(error = %err, "Deferred search update dropped");
            }
        }))
    }
}

pub fn about(_: &RenderContext<'_>) -> Result<View, RenderError> {
    Ok(View::element(
        "div",
        vec![
            View::heading("About"),
            View::paragraph("A small demonstration of nested client-side routing."),
        ],
    ))
}

/// A single user, with an outlet for their nested pages.
///
/// Unknown ids raise a not-found error for the route's boundary.
pub fn user(
    directory: UserDirectory,
) -> impl Fn(&RenderContext<'_>) -> Result<View, RenderError> + Send + Sync + 'static {
    move |ctx| {
        let raw = ctx.param("userId").unwrap_or_default();
        let record = directory
            .lookup(raw)
            .ok_or_else(|| RenderError::not_found(format!("user {raw}")))?;

        Ok(View::fragment(vec![
            View::element(
                "div",
                vec![View::text(format!("User with {} is named {}", record.id, record.name))],
            ),
            View::element("p", vec![ctx.link("followers", "Followers")]),
            ctx.outlet_with(FollowerContext {
                name_of_user: record.name.clone(),
            })?,
        ]))
    }
}

pub fn followers(ctx: &RenderContext<'_>) -> Result<View, RenderError> {
    match ctx.outlet_context::<FollowerContext>() {
        Ok(context) => Ok(View::heading(format!("{}'s Followers", context.name_of_user))),
        Err(err) => {
            warn!(route = %ctx.route_id(), error = %err, "Followers rendered without a user");
            Ok(View::paragraph(
                "Followers can only be shown from a user's page.",
            ))
        }
    }
}

pub fn not_found(ctx: &RenderContext<'_>) -> Result<View, RenderError> {
    Ok(fallback("Not Found", ctx))
}

pub fn error_component(ctx: &RenderContext<'_>) -> Result<View, RenderError> {
    Ok(fallback("Something went wrong", ctx))
}

fn fallback(title: &str, ctx: &RenderContext<'_>) -> View {
    let mut children = vec![View::heading(title)];
    if let Some(err) = ctx.error() {
        children.push(View::paragraph(err.to_string()));
    }
    View::element("div", children)
}
