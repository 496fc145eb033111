//! tsvclean - Byte-bounded truncation
//!
//! Shortens text to a maximum number of UTF-8 bytes without ever splitting
//! a multi-byte character.

use std::borrow::Cow;

/// Truncate `value` to the longest prefix of whole characters whose UTF-8
/// encoding fits in `max_bytes`.
///
/// Values already within the bound are borrowed back unchanged. A character
/// whose encoding would cross the bound is dropped entirely, so the result is
/// always valid UTF-8 and always a prefix of `value`.
pub fn truncate_to_bytes(value: &str, max_bytes: usize) -> Cow<'_, str> {
    if value.len() <= max_bytes {
        return Cow::Borrowed(value);
    }

    // Walk back from the bound to the nearest char boundary.
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }

    Cow::Owned(value[..end].to_string())
}

/// Returns true if `truncate_to_bytes(value, max_bytes)` would shorten `value`.
#[inline]
pub fn exceeds(value: &str, max_bytes: usize) -> bool {
    value.len() > max_bytes
}
