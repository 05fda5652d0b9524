//! Header and root layout.

use tenvis_waypoint_core::{RenderContext, RenderError, View};

/// Navigation header: a link home and a button that navigates to About.
pub fn header(ctx: &RenderContext<'_>) -> View {
    View::element(
        "h1",
        vec![View::list(vec![
            ctx.link("/", "Home"),
            ctx.button("About", "/about"),
        ])],
    )
}

/// The outer shell: header plus the matched child route.
pub fn root(ctx: &RenderContext<'_>) -> Result<View, RenderError> {
    Ok(View::fragment(vec![
        header(ctx),
        View::element("main", vec![ctx.outlet()?]),
    ]))
}
