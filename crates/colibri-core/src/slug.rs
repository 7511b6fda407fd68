//! Slug and label helpers for attribute taxonomy registration.

/// Lower-cases and dash-separates a raw attribute or term name so it can be
/// used as a taxonomy/term slug. Consecutive separator characters collapse
/// into one dash; leading and trailing dashes are trimmed.
#[must_use]
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut last_dash = true;
    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Builds a display label from a slug: dashes become spaces and each word is
/// upper-cased on its first letter (`"tipo-de-tela"` → `"Tipo De Tela"`).
#[must_use]
pub fn label_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
