//! Pathname helpers.
//!
//! Pathnames are compared segment by segment: empty segments produced by
//! leading, trailing or repeated slashes carry no meaning.

use percent_encoding::percent_decode_str;

/// Iterate over the non-empty segments of a pathname.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Normalize a pathname to `/a/b` form.
#[must_use]
pub fn normalize(path: &str) -> String {
    let joined = segments(path).collect::<Vec<_>>().join("/");
    format!("/{joined}")
}

/// Join a child pathname onto a parent pathname.
#[must_use]
pub fn join(parent: &str, child: &str) -> String {
    normalize(&format!("{parent}/{child}"))
}

/// Build a pathname from already-split segments.
#[must_use]
pub fn from_segments<S: AsRef<str>>(parts: &[S]) -> String {
    let joined = parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("/");
    format!("/{joined}")
}

/// Percent-decode a single path segment.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
#[must_use]
pub fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}
