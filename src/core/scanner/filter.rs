//! File filtering logic for the scanner.

use std::collections::HashSet;
use std::path::Path;

/// Decides which walked files are reported
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    /// Accepted extensions, lower-case without dot; `None` accepts any file
    extensions: Option<HashSet<String>>,
    /// Whether to include hidden files
    include_hidden: bool,
}

impl ExtensionFilter {
    /// Accept every non-hidden file
    pub fn any() -> Self {
        Self {
            extensions: None,
            include_hidden: false,
        }
    }

    /// Accept only the given extensions (dot and case are ignored)
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = Some(
            extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        );
        self
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden && is_hidden(path) {
            return false;
        }

        let Some(extensions) = &self.extensions else {
            return true;
        };

        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| extensions.contains(&e.to_ascii_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::any()
    }
}

pub(super) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_accepts_every_visible_file() {
        let filter = ExtensionFilter::any();
        assert!(filter.should_include(Path::new("/photos/document.pdf")));
        assert!(filter.should_include(Path::new("/photos/no_extension")));
    }

    #[test]
    fn extension_list_is_case_and_dot_insensitive() {
        let filter = ExtensionFilter::any().with_extensions([".JPG", "heic"]);
        assert!(filter.should_include(Path::new("/photos/image.jpg")));
        assert!(filter.should_include(Path::new("/photos/IMG_1234.HEIC")));
        assert!(!filter.should_include(Path::new("/photos/video.mp4")));
    }

    #[test]
    fn excludes_hidden_by_default() {
        let filter = ExtensionFilter::any();
        assert!(!filter.should_include(Path::new("/photos/.hidden.jpg")));
    }

    #[test]
    fn can_include_hidden() {
        let filter = ExtensionFilter::any().with_hidden(true);
        assert!(filter.should_include(Path::new("/photos/.hidden.jpg")));
    }

    #[test]
    fn no_extension_is_excluded_when_list_given() {
        let filter = ExtensionFilter::any().with_extensions(["jpg"]);
        assert!(!filter.should_include(Path::new("/photos/no_extension")));
    }
}
