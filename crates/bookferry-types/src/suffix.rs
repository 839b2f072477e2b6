//! Filename suffix matching
//!
//! Content formats are configured without a leading dot ("pdf", "mp3");
//! metadata suffixes are configured with their full dotted form
//! (".meta.json"). Classification is always by suffix, never by content.

use std::path::Path;

/// Check whether a file name ends with the given dotted suffix
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(suffix))
}

/// Check whether a file name matches any content format (dot-less suffixes)
pub fn matches_any_format(path: &Path, formats: &[String]) -> bool {
    formats
        .iter()
        .any(|format| has_suffix(path, &format!(".{format}")))
}

/// Check whether a file name matches any dotted suffix
pub fn matches_any_suffix(path: &Path, suffixes: &[String]) -> bool {
    suffixes.iter().any(|suffix| has_suffix(path, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_has_suffix() {
        let path = PathBuf::from("/books/b1/b1.meta.json");
        assert!(has_suffix(&path, ".meta.json"));
        assert!(!has_suffix(&path, ".characterization.json"));
    }

    #[test]
    fn test_matches_any_format() {
        let formats = vec!["pdf".to_string(), "epub".to_string()];
        assert!(matches_any_format(Path::new("b1.pdf"), &formats));
        assert!(matches_any_format(Path::new("b1.epub"), &formats));
        assert!(!matches_any_format(Path::new("b1.mp3"), &formats));
        // a bare "pdf" file name has no dot and must not match
        assert!(!matches_any_format(Path::new("pdf"), &formats));
    }

    #[test]
    fn test_matches_any_suffix() {
        let suffixes = vec![".meta.json".to_string()];
        assert!(matches_any_suffix(Path::new("b1.meta.json"), &suffixes));
        assert!(!matches_any_suffix(
            Path::new("transfer_registry.json"),
            &suffixes
        ));
    }
}
