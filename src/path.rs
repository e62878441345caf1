//! Slash-delimited path handling.
//!
//! Paths are always interpreted from the root. Empty segments are dropped, so `//a///b/` and
//! `/a/b` name the same object, and `""`, `"/"` and `"///"` all name the root.

/// The non-empty segments of `path`, in order.
pub fn components(path: &str) -> impl Iterator<Item = &str> + Clone {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Splits `path` into its parent's segments and its final segment.
///
/// Returns `None` for the root, which has no parent.
pub fn split_parent(path: &str) -> Option<(Vec<&str>, &str)> {
    let mut segments = components(path).collect::<Vec<_>>();
    let leaf = segments.pop()?;

    Some((segments, leaf))
}

/// The canonical `/a/b` spelling of `path`.
pub fn normalize(path: &str) -> String {
    format!("/{}", components(path).collect::<Vec<_>>().join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components() {
        assert_eq!(components("/a/b/c").collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(components("a/b").collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(components("//a///b/").collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(components("").count(), 0);
        assert_eq!(components("/").count(), 0);
    }

    #[test]
    fn test_split_parent() {
        assert_eq!(split_parent("/a/b/c"), Some((vec!["a", "b"], "c")));
        assert_eq!(split_parent("/a/"), Some((vec![], "a")));
        assert_eq!(split_parent("/"), None);
        assert_eq!(split_parent(""), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("///"), "/");
        assert_eq!(normalize("a//b/"), "/a/b");
    }
}
