//! JSON Pointer (RFC 6901) helpers for reference fragments.

use std::borrow::Cow;

/// Escape a single path segment per RFC 6901.
///
/// - `~` → `~0`
/// - `/` → `~1`
///
/// Returns `Cow::Borrowed` when no escaping is needed (the common case).
pub fn escape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') || segment.contains('/') {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Unescape a single path segment per RFC 6901.
///
/// Order matters: `~1` first, so `~01` decodes to `~1` and not `/`.
pub fn unescape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains("~0") || segment.contains("~1") {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Decoded last segment of a pointer, or `None` for the whole-document pointer.
///
/// ```
/// use swagger_refs_core::pointer::last_segment;
/// assert_eq!(last_segment("/definitions/a~1b").as_deref(), Some("a/b"));
/// assert_eq!(last_segment(""), None);
/// ```
pub fn last_segment(pointer: &str) -> Option<String> {
    let (_, last) = pointer.rsplit_once('/')?;
    if last.is_empty() {
        return None;
    }
    Some(unescape_pointer_segment(last).into_owned())
}
