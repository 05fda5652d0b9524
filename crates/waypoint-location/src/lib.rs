//! # waypoint-location
//!
//! Location model for the Waypoint client-side router.
//!
//! This crate defines how an application address is represented and
//! manipulated before any routing happens:
//!
//! - `Location` - Parsed href (pathname, search, hash) with relative resolution
//! - `QueryParams` - Ordered query-string parameters
//! - `path` - Segment splitting, normalization and percent-decoding
//!
//! ## Example
//!
//! ```rust
//! use waypoint_location::Location;
//!
//! let user = Location::parse("/users/2?tab=info").unwrap();
//! assert_eq!(user.pathname(), "/users/2");
//! assert_eq!(user.search().get("tab"), Some("info"));
//!
//! // Relative hrefs resolve against a route's pathname
//! let followers = Location::resolve("/users/2", "followers").unwrap();
//! assert_eq!(followers.href(), "/users/2/followers");
//! ```

pub mod location;
pub mod path;
pub mod query;

pub use location::{Location, LocationError};
pub use query::QueryParams;
