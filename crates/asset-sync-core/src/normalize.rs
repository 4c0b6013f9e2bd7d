use serde::Serialize;
use std::fmt;

/// Comparison key for product names. Only [`normalize`] constructs one, so two
/// keys are equal exactly when their sources name the same product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '-' || c == '_'
}

/// Lower-case `name` and collapse every run of whitespace, `-` and `_` into a
/// single space, dropping separators at either end.
pub fn normalize(name: &str) -> NormalizedKey {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;

    for c in name.chars() {
        if is_separator(c) {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.extend(c.to_lowercase());
    }

    NormalizedKey(out)
}

/// Canonical on-disk form of a directory name.
pub fn canonical_dir_name(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_separators() {
        assert_eq!(normalize("Classic V Cut").as_str(), "classic v cut");
        assert_eq!(normalize("classic-v-cut").as_str(), "classic v cut");
        assert_eq!(normalize("  classic__v -- cut  ").as_str(), "classic v cut");
        assert_eq!(normalize("\tClassic\nV\u{00A0}Cut").as_str(), "classic v cut");
    }

    #[test]
    fn test_separator_and_case_insensitive() {
        let a = normalize("Fit Shorts (Black)");
        let b = normalize("fit-shorts_(black)");
        let c = normalize("FIT   SHORTS (BLACK)");
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.as_str(), "fit shorts (black)");
    }

    #[test]
    fn test_empty_and_separator_only() {
        assert!(normalize("").is_empty());
        assert!(normalize(" -_ ").is_empty());
    }

    #[test]
    fn test_non_ascii_is_deterministic() {
        let first = normalize("ÇAMAŞIR Seti_Kız");
        let second = normalize("ÇAMAŞIR Seti_Kız");
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "çamaşir seti kız");
    }

    #[test]
    fn test_canonical_dir_name() {
        assert_eq!(canonical_dir_name("Classic V Cut"), "classic v cut");
        assert_eq!(canonical_dir_name("men"), "men");
    }
}
