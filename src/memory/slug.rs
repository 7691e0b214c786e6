//! Slugs for feature-spec file names.

/// Longest slug, in characters, before the trailing hyphen is trimmed.
const MAX_SLUG_LEN: usize = 60;

/// Turn free text into a file-name-safe slug.
///
/// Lowercases, drops everything except ASCII letters, digits, whitespace and
/// hyphens, replaces whitespace runs with a hyphen, collapses repeated
/// hyphens and truncates to 60 characters.
pub fn slugify(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();

    let mut slug = String::with_capacity(kept.len());
    for c in kept.chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    let mut slug: String = slug.chars().take(MAX_SLUG_LEN).collect();
    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}
