// src/normalize.rs
//! Bullet text normalization applied before improvements are sent back for generation

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading bullet marker cluster: one or more markers, each followed by whitespace.
/// Stacked markers ("• - foo") count as a single prefix.
static BULLET_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[•◦▪‣●·*\-–]\s+)+").expect("valid bullet regex"));

/// Strip one leading bullet prefix, collapse whitespace runs and trim.
///
/// Idempotent: `normalize_bullet(&normalize_bullet(s)) == normalize_bullet(s)`.
pub fn normalize_bullet(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match BULLET_PREFIX.find(&collapsed) {
        Some(prefix) => collapsed[prefix.end()..].to_string(),
        None => collapsed,
    }
}
