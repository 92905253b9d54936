// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! URL-safe slugs for public card paths (`/c/{slug}`).

/// Longest slug we will store. `slugify` itself does not cut; stored
/// slugs are capped with [`truncate`] and checked by [`is_valid_slug`].
pub const MAX_SLUG_LEN: usize = 80;

/// Derive a slug from a card title.
///
/// Lowercases the title, collapses every run of non-alphanumeric
/// characters into a single hyphen and trims hyphens from both ends.
/// Non-ASCII letters count as separators so the result is always ASCII.
/// The result is not length-limited.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Cut a slug to at most `max` bytes without leaving a trailing hyphen.
pub fn truncate(slug: &str, max: usize) -> String {
    truncate_at_boundary(slug.to_string(), max)
}

/// Check that `slug` is lowercase, hyphen-separated and within length.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Append a numeric suffix, keeping the result within [`MAX_SLUG_LEN`].
///
/// `with_suffix("jane-doe", 2)` is `"jane-doe-2"`.
pub fn with_suffix(base: &str, n: u32) -> String {
    let suffix = format!("-{}", n);
    let base = truncate_at_boundary(base.to_string(), MAX_SLUG_LEN - suffix.len());
    format!("{}{}", base, suffix)
}

fn truncate_at_boundary(mut slug: String, max: usize) -> String {
    if slug.len() > max {
        slug.truncate(max);
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
