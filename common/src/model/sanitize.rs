//! Turns user-selected text into canonical variable ids.
//!
//! Ids are namespaced by the block type they were minted in (`basic_info_name`)
//! so two blocks never produce the same generic id. Sanitizing an id that
//! already carries the prefix returns it unchanged.

use regex::Regex;
use std::sync::LazyLock;

/// Returned when the input has nothing left after sanitizing.
pub const FALLBACK_NAME: &str = "variable";

static NON_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_]+").expect("slug pattern is valid"));

static UNDERSCORE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{2,}").expect("underscore pattern is valid"));

static NON_ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("prefix pattern is valid"));

/// Lowercases, drops braces and folds everything outside `[a-z0-9_]` into
/// single underscores. Never returns an empty string.
pub fn sanitize_base_name(raw: &str) -> String {
    let lowered = raw.to_lowercase().replace(['{', '}'], "");
    let slug = NON_SLUG_RE.replace_all(&lowered, "_");
    let slug = UNDERSCORE_RUN_RE.replace_all(&slug, "_");
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        slug.to_string()
    }
}

/// Lowercases and folds non-alphanumeric runs of a prefix into `_`.
/// Trailing underscores are kept. Returns `None` when nothing alphanumeric
/// remains.
pub fn normalize_prefix(prefix: &str) -> Option<String> {
    let normalized = NON_ALNUM_RE
        .replace_all(&prefix.to_lowercase(), "_")
        .into_owned();
    normalized
        .chars()
        .any(|c| c.is_ascii_alphanumeric())
        .then_some(normalized)
}

/// Removes a leading `prefix_` segment, compared case-insensitively.
pub fn strip_prefix<'a>(name: &'a str, prefix: &str) -> &'a str {
    let Some(normalized) = normalize_prefix(prefix) else {
        return name;
    };
    let lead = format!("{}_", normalized);
    match name.get(..lead.len()) {
        Some(head) if head.eq_ignore_ascii_case(&lead) => &name[lead.len()..],
        _ => name,
    }
}

/// Canonical id for `raw`, namespaced by `prefix` when one is given.
pub fn sanitize_variable_name(raw: &str, prefix: Option<&str>) -> String {
    let normalized = prefix.and_then(normalize_prefix);
    match (prefix, normalized) {
        (Some(prefix), Some(normalized)) => {
            let base = sanitize_base_name(strip_prefix(raw, prefix));
            format!("{}_{}", normalized, base)
        }
        _ => sanitize_base_name(raw),
    }
}

/// Replaces the byte range `start..end` of `text` with a variable token.
///
/// The id is minted from `name` when given, otherwise from the selected text.
/// Returns the new text and the id, or `None` for an empty or invalid
/// selection.
pub fn promote_selection(
    text: &str,
    start: usize,
    end: usize,
    name: Option<&str>,
    prefix: Option<&str>,
) -> Option<(String, String)> {
    if start >= end {
        return None;
    }
    let selected = text.get(start..end)?;
    let raw = match name {
        Some(name) if !name.trim().is_empty() => name,
        _ => selected,
    };
    let id = sanitize_variable_name(raw, prefix);
    let token = super::variable::format_variable(&id);
    let new_text = format!("{}{}{}", &text[..start], token, &text[end..]);
    Some((new_text, id))
}
