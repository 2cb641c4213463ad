//! Common test utilities for integration tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A test fixture that creates a temporary content folder.
pub struct TestSite {
    #[allow(dead_code)] // Kept to prevent TempDir from being dropped
    dir: TempDir,
    pub root: PathBuf,
}

impl TestSite {
    /// Creates a new empty site with a .readtime directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        // Canonicalize the path to resolve symlinks (e.g., /var -> /private/var on macOS)
        let root = dir
            .path()
            .canonicalize()
            .expect("Failed to canonicalize temp directory");

        std::fs::create_dir(root.join(".readtime")).expect("Failed to create .readtime directory");

        Self { dir, root }
    }

    /// Creates a content file with the given content.
    pub fn create_item(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.root.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write content file");
        file_path
    }

    /// Creates a content file with frontmatter.
    #[allow(dead_code)]
    pub fn create_item_with_frontmatter(
        &self,
        path: &str,
        frontmatter: &BTreeMap<&str, &str>,
        body: &str,
    ) -> PathBuf {
        let mut content = String::from("---\n");
        for (key, value) in frontmatter {
            content.push_str(&format!("{}: {}\n", key, value));
        }
        content.push_str("---\n\n");
        content.push_str(body);
        self.create_item(path, &content)
    }

    /// Writes `.readtime/config.toml`.
    #[allow(dead_code)]
    pub fn write_config(&self, toml: &str) -> PathBuf {
        self.create_item(".readtime/config.toml", toml)
    }

    /// Returns the path to the root directory.
    pub fn path(&self) -> &Path {
        &self.root
    }
}

impl Default for TestSite {
    fn default() -> Self {
        Self::new()
    }
}

/// `count` filler words separated by spaces.
#[allow(dead_code)]
pub fn words(count: usize) -> String {
    vec!["lorem"; count].join(" ")
}

/// Asserts that HTML content contains the expected substring.
#[allow(dead_code)]
pub fn assert_html_contains(html: &str, expected: &str) {
    assert!(
        html.contains(expected),
        "Expected HTML to contain '{}', but it wasn't found.\nHTML content:\n{}",
        expected,
        html
    );
}

/// Asserts that HTML content does not contain the unexpected substring.
#[allow(dead_code)]
pub fn assert_html_not_contains(html: &str, unexpected: &str) {
    assert!(
        !html.contains(unexpected),
        "Expected HTML to NOT contain '{}', but it was found.\nHTML content:\n{}",
        unexpected,
        html
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_site() {
        let site = TestSite::new();
        assert!(site.path().exists());
        assert!(site.path().join(".readtime").exists());
    }

    #[test]
    fn test_create_item_in_subdir() {
        let site = TestSite::new();
        let path = site.create_item("notes/guide.md", "# Guide");
        assert!(path.exists());
        assert!(site.path().join("notes").is_dir());
    }

    #[test]
    fn test_create_item_with_frontmatter() {
        let site = TestSite::new();
        let fm = BTreeMap::from([("title", "My Title"), ("category", "page")]);

        let path = site.create_item_with_frontmatter("post.md", &fm, "Content here");
        let content = std::fs::read_to_string(&path).unwrap();

        assert!(content.starts_with("---\n"));
        assert!(content.contains("title: My Title"));
        assert!(content.contains("category: page"));
        assert!(content.contains("Content here"));
    }

    #[test]
    fn test_words() {
        assert_eq!(words(3), "lorem lorem lorem");
        assert_eq!(words(0), "");
    }
}
