//! Version-aware ordering of tag names.
//!
//! Tags are compared as `v`-prefixed semantic versions. `v1` and `v1.2` are
//! accepted as shorthands for `v1.0.0` and `v1.2.0` as long as they carry no
//! pre-release or build suffix. Build metadata never affects precedence.
//! Names that are not versions rank below every version and tie with each
//! other.

use std::borrow::Cow;
use std::cmp::Ordering;

use semver::Version;

/// Prefix `v` unless the name already starts with it.
pub fn normalize_tag(name: &str) -> Cow<'_, str> {
    if name.starts_with('v') {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("v{}", name))
    }
}

/// Parse a `v`-prefixed version, expanding shorthand forms.
pub fn parse_tag_version(normalized: &str) -> Option<Version> {
    let rest = normalized.strip_prefix('v')?;
    let suffix_at = rest.find(['-', '+']).unwrap_or(rest.len());
    let (core, suffix) = rest.split_at(suffix_at);

    let expanded = match core.split('.').count() {
        1 if suffix.is_empty() => format!("{}.0.0", core),
        2 if suffix.is_empty() => format!("{}.0", core),
        3 => rest.to_string(),
        _ => return None,
    };
    Version::parse(&expanded).ok()
}

/// Compare two tag names by version precedence (ascending).
pub fn compare_tags(a: &str, b: &str) -> Ordering {
    let a = parse_tag_version(&normalize_tag(a));
    let b = parse_tag_version(&normalize_tag(b));
    match (a, b) {
        (Some(a), Some(b)) => a.cmp_precedence(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
