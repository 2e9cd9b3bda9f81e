//! Slug and code helpers for categories, attribute codes and choice values.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Runs of characters that are not allowed in a slug.
static NON_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_]+").expect("valid regex"));

/// Maximum length of a category slug or attribute code.
pub const MAX_SLUG_LEN: usize = 140;

/// Derive a slug from a human-readable name.
///
/// Lowercases, replaces every run of characters other than ASCII letters,
/// digits and `_` with a single hyphen, and trims hyphens at both ends.
///
/// ```
/// use stockroom_core::naming::slugify;
/// assert_eq!(slugify("Thread Size (mm)"), "thread-size-mm");
/// assert_eq!(slugify("  Oil / Air  "), "oil-air");
/// ```
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let slug = NON_SLUG_RE.replace_all(&lowered, "-");
    let trimmed = slug.trim_matches('-');
    trimmed.chars().take(MAX_SLUG_LEN).collect()
}

/// Derive an attribute code from its display name: a slug with `_` as the
/// separator.
///
/// ```
/// use stockroom_core::naming::attribute_code;
/// assert_eq!(attribute_code("Thread Size"), "thread_size");
/// ```
pub fn attribute_code(name: &str) -> String {
    slugify(name).replace('-', "_")
}

/// Return `base` if it is free, otherwise the first `base-N` (N = 1, 2, ...)
/// for which `is_taken` returns false.
pub fn unique_slug(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }
    let mut counter = 1u32;
    loop {
        let candidate = format!("{base}-{counter}");
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Validate a slug or attribute code supplied by a caller.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() {
        return Err(CoreError::Validation("Slug must not be empty".into()));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(CoreError::Validation(format!(
            "Slug must be at most {MAX_SLUG_LEN} characters"
        )));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(format!(
            "Slug '{slug}' may only contain lowercase letters, digits, '-' and '_'"
        )));
    }
    Ok(())
}
