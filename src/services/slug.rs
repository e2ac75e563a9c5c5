//! Slug derivation
//!
//! Turns a post title into a URL-safe permalink key. Derivation is
//! deterministic and performs no disambiguation; callers are responsible
//! for rejecting collisions.

/// Generate a URL-friendly slug from a title.
///
/// Lowercases the title, drops every character outside ASCII
/// alphanumerics, whitespace, and hyphens, then collapses whitespace and
/// hyphen runs into single hyphens and trims hyphens from both ends.
pub fn slugify(title: &str) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    let mut result = String::new();
    let mut prev_hyphen = false;

    for c in cleaned.chars() {
        if c.is_whitespace() || c == '-' {
            if !prev_hyphen && !result.is_empty() {
                result.push('-');
                prev_hyphen = true;
            }
        } else {
            result.push(c);
            prev_hyphen = false;
        }
    }

    result.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slugify_simple() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_slugify_punctuation_stripped() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn test_slugify_collapses_whitespace() {
        assert_eq!(slugify("Hello   World"), "hello-world");
    }

    #[test]
    fn test_slugify_collapses_hyphen_runs() {
        assert_eq!(slugify("rust -- async"), "rust-async");
    }

    #[test]
    fn test_slugify_trims_hyphens() {
        assert_eq!(slugify("- Hello -"), "hello");
    }

    #[test]
    fn test_slugify_underscores_removed() {
        // Underscores are outside the allowed set and simply vanish
        assert_eq!(slugify("hello_world"), "helloworld");
    }

    #[test]
    fn test_slugify_non_ascii_stripped() {
        assert_eq!(slugify("Café Crème"), "caf-crme");
        assert_eq!(slugify("技术"), "");
    }

    #[test]
    fn test_slugify_empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_numbers_kept() {
        assert_eq!(slugify("Top 10 Tips"), "top-10-tips");
    }

    proptest! {
        #[test]
        fn slugify_output_is_url_safe(title in ".{0,80}") {
            let slug = slugify(&title);
            prop_assert!(slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        #[test]
        fn slugify_is_deterministic_and_idempotent(title in ".{0,80}") {
            let once = slugify(&title);
            prop_assert_eq!(&slugify(&title), &once);
            prop_assert_eq!(slugify(&once), once);
        }
    }
}
