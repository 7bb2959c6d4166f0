//! crates/nulis_core/src/slug.rs
//!
//! Slug derivation for article titles. The slug is the public lookup key:
//! lowercase ASCII, words joined by single hyphens. Uniqueness is owned by
//! the store's unique constraint; `candidates` supplies the `base`,
//! `base-1`, `base-2`, ... sequence the create path walks until an insert
//! succeeds.

/// Derives a slug candidate from a title: lowercased, non-alphanumeric
/// characters collapsed into single hyphens, trimmed of leading/trailing
/// hyphens. Blank or fully-stripped titles fall back to `"untitled"`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Iterator over slug candidates: the base itself, then `base-1`,
/// `base-2`, ... strictly increasing.
pub fn candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    (0u32..).map(move |n| {
        if n == 0 {
            base.to_string()
        } else {
            format!("{}-{}", base, n)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("My Article"), "my-article");
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn collapses_runs_of_separators() {
        assert_eq!(slugify("a  --  b"), "a-b");
        assert_eq!(slugify("  spaced  out  "), "spaced-out");
    }

    #[test]
    fn strips_non_ascii() {
        assert_eq!(slugify("café ☕ notes"), "caf-notes");
    }

    #[test]
    fn blank_titles_fall_back_to_untitled() {
        assert_eq!(slugify(""), "untitled");
        assert_eq!(slugify("   "), "untitled");
        assert_eq!(slugify("!!!"), "untitled");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(slugify("2024 review"), "2024-review");
    }

    #[test]
    fn candidate_sequence_is_base_then_counters() {
        let seq: Vec<String> = candidates("my-article").take(4).collect();
        assert_eq!(seq, ["my-article", "my-article-1", "my-article-2", "my-article-3"]);
    }
}
