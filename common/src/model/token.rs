//! Splits block text into literal runs and `{{variable}}` references.
//!
//! Only the exact form `{{` + `[A-Za-z0-9_]+` + `}}` is a token. Anything else,
//! including unbalanced or nested braces, stays literal text.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("token pattern is valid"));

static WHOLE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\{[A-Za-z0-9_]+\}\}$").expect("token pattern is valid"));

/// One segment of a tokenized string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TextPart {
    Literal(String),
    VariableRef(String),
}

impl TextPart {
    /// The exact source text this part was cut from.
    pub fn source_text(&self) -> String {
        match self {
            TextPart::Literal(text) => text.clone(),
            TextPart::VariableRef(id) => super::variable::format_variable(id),
        }
    }
}

/// Partitions `text` into literal and variable parts, in order.
///
/// An empty string yields a single empty literal; otherwise no empty literal
/// is emitted.
pub fn tokenize(text: &str) -> Vec<TextPart> {
    let mut parts = Vec::new();
    let mut last = 0;
    for caps in TOKEN_RE.captures_iter(text) {
        let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            parts.push(TextPart::Literal(text[last..whole.start()].to_string()));
        }
        parts.push(TextPart::VariableRef(id.as_str().to_string()));
        last = whole.end();
    }
    if last < text.len() || parts.is_empty() {
        parts.push(TextPart::Literal(text[last..].to_string()));
    }
    parts
}

/// Joins parts back into the string they were produced from.
pub fn join(parts: &[TextPart]) -> String {
    parts.iter().map(TextPart::source_text).collect()
}

/// True only when the whole of `text` is one well-formed token.
pub fn is_variable(text: &str) -> bool {
    WHOLE_TOKEN_RE.is_match(text)
}

/// The id inside the first token found in `text`.
pub fn extract_variable_name(text: &str) -> Option<String> {
    TOKEN_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Every token id in `text`, in order of appearance, repeats included.
pub fn variable_ids(text: &str) -> impl Iterator<Item = &str> {
    TOKEN_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Replaces every token whose id resolves through `lookup`. Unresolved tokens
/// are kept verbatim.
pub fn render_text<F>(text: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    TOKEN_RE
        .replace_all(text, |caps: &regex::Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
