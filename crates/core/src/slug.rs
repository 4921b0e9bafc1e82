//! URL slug validation.

use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::unwrap_used)]
static SLUG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

/// Maximum slug length, matching the column width.
pub const MAX_SLUG_LEN: usize = 256;

/// Whether `slug` is lowercase ASCII words joined by single hyphens.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() <= MAX_SLUG_LEN && SLUG_PATTERN.is_match(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        assert!(is_valid_slug("debat-budgetaire"));
        assert!(is_valid_slug("legislatives-2024"));
        assert!(is_valid_slug("a"));
    }

    #[test]
    fn test_invalid_slugs() {
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Débat"));
        assert!(!is_valid_slug("-debat"));
        assert!(!is_valid_slug("debat--budget"));
        assert!(!is_valid_slug("debat budget"));
        assert!(!is_valid_slug(&"a".repeat(MAX_SLUG_LEN + 1)));
    }
}
