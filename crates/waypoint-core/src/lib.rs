//! # waypoint-core
//!
//! Route matching, nested rendering and navigation for the Waypoint router.
//!
//! This crate provides the building blocks of a client-side router:
//!
//! - **Route** - Declarative route tree with page components
//! - **Router** - Ranked pattern matching and not-found resolution
//! - **Outlet** - Nested rendering with typed context and error boundaries
//! - **Browser** - History, mount effects and atomic state snapshots
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Navigator  │────▶│   Browser   │────▶│   Router    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        ▲                   │                   │
//!        │                   ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Deferred   │◀────│ MountGuard  │     │   Outlet    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use tenvis_waypoint_core::{Route, Router, View};
//! use waypoint_location::Location;
//!
//! let router = Router::new(vec![Route::new("/")
//!     .element(|ctx| Ok(View::fragment(vec![View::heading("App"), ctx.outlet()?])))
//!     .error_element(|_| Ok(View::heading("Not Found")))
//!     .child(Route::new("about").element(|_| Ok(View::paragraph("About")))) ])
//! .unwrap();
//!
//! let location = Location::parse("/about").unwrap();
//! let resolution = router.resolve(&location);
//! let rendered = router.render(&location, &resolution);
//! assert_eq!(rendered.view.text_content(), "App\nAbout");
//! ```

pub mod browser;
pub mod effect;
pub mod error;
pub mod history;
pub mod matcher;
pub mod navigator;
pub mod outlet;
pub mod pattern;
pub mod route;
pub mod router;
pub mod view;

pub use browser::{Browser, NavigationOutcome, RouteMatchState};
pub use effect::{Deferred, MountContext, MountGuard};
pub use error::{RenderError, RouterError};
pub use history::{History, HistoryEntry, NavigationType};
pub use matcher::{MatchedRoute, Params, Resolution};
pub use navigator::{Command, Commands, NavigateOptions, Navigator};
pub use outlet::{HandledError, RenderContext, Rendered};
pub use pattern::{Pattern, Segment};
pub use route::{Component, MountHook, Route, RouteId};
pub use router::{Router, RouterStats};
pub use view::{Action, View};
