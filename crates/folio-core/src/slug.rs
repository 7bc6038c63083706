//! URL-friendly slugs from display titles.

/// Convert a title into a slug: lowercase, ASCII alphanumerics and
/// underscores kept, whitespace and hyphen runs collapsed into single
/// hyphens, leading/trailing hyphens trimmed. Everything else is dropped.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
        } else if (c.is_whitespace() || c == '-') && !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
