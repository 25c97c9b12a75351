//! `url(...)` scanning for CSS text.
//!
//! Rewriting happens in two steps so the async inliner can sit in between:
//! [`url_references`] lists the distinct captures, the caller inlines each one,
//! and [`substitute_urls`] rewrites every occurrence in a single pass.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static CSS_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"url\s*\((.+?)\)").expect("static css url pattern"));

/// Distinct raw captures (the text between the parentheses) in first-seen order.
pub fn url_references(css: &str) -> Vec<&str> {
    let mut seen = Vec::new();
    for caps in CSS_URL.captures_iter(css) {
        if let Some(raw) = caps.get(1).map(|m| m.as_str()) {
            if !seen.contains(&raw) {
                seen.push(raw);
            }
        }
    }
    seen
}

/// Strips surrounding whitespace and quotes from a raw capture.
pub fn clean_reference(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\'' || c == '"')
}

/// Replaces each `url(<raw>)` whose raw capture has an entry in `replacements`
/// with `url(<replacement>)`. Text outside the matches is copied unchanged.
pub fn substitute_urls(css: &str, replacements: &HashMap<String, String>) -> String {
    CSS_URL
        .replace_all(css, |caps: &Captures<'_>| {
            match caps.get(1).and_then(|m| replacements.get(m.as_str())) {
                Some(inlined) => format!("url({inlined})"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
