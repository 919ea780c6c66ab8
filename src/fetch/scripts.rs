// src/fetch/scripts.rs

//! Pull JavaScript references out of an HTML page.
//!
//! This is deliberately a text scan rather than an HTML parse: references in
//! comments, inline scripts and string concatenations count too.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

use crate::fetch::content::ScriptSet;

static SCRIPT_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)([^"'\s<>]+\.js\b(?:\?[^"'\s<>]*)?)"#)
        .unwrap_or_else(|e| panic!("script reference pattern is invalid: {e}"))
});

/// Extract every `.js` reference (query string included) from `html`.
///
/// Each reference keeps the first line it was seen on. With `base`, relative
/// references are resolved against the page URL.
pub fn extract_script_refs(html: &str, base: Option<&Url>) -> ScriptSet {
    let mut set = ScriptSet::new();

    for (idx, line) in html.lines().enumerate() {
        for cap in SCRIPT_REF.captures_iter(line) {
            let raw = &cap[1];
            let reference = match base {
                Some(base) => base
                    .join(raw)
                    .map(String::from)
                    .unwrap_or_else(|_| raw.to_string()),
                None => raw.to_string(),
            };
            set.insert(reference, Some(idx + 1));
        }
    }

    set
}
