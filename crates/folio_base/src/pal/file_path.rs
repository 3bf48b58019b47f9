use relative_path::{Component, RelativePath, RelativePathBuf};
use std::path::Path;

/* 📖 # Why use RelativePathBuf for FilePath?

Every path handed to the PAL is relative to the PAL's base directory (the working
directory for RealPal). Wrapping RelativePathBuf makes that explicit in the type and
keeps path separators consistent across platforms.
*/

/// Type-safe wrapper for file paths relative to the PAL base directory.
///
/// ```
/// use folio_base::FilePath;
///
/// let path = FilePath::from("data/messages.jsonl");
/// assert_eq!(path.parent(), Some(FilePath::from("data")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilePath(RelativePathBuf);

impl FilePath {
    /// Returns the path as a string slice using `/` separators.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Converts to a regular Path for use with std::fs operations.
    /// This returns the relative path portion without a base directory.
    pub fn as_path(&self) -> &Path {
        Path::new(self.0.as_str())
    }

    /// Returns the parent directory, or `None` for a top-level file.
    pub fn parent(&self) -> Option<FilePath> {
        self.0
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .map(|parent| Self(parent.to_relative_path_buf()))
    }

    /// Returns true if any component walks up out of the base directory.
    pub fn escapes_base(&self) -> bool {
        self.0.as_str().starts_with('/')
            || self
                .0
                .components()
                .any(|c| matches!(c, Component::ParentDir))
    }
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<String> for FilePath {
    fn from(s: String) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<&RelativePath> for FilePath {
    fn from(p: &RelativePath) -> Self {
        Self(p.to_relative_path_buf())
    }
}

impl std::fmt::Display for FilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_path_from_str() {
        let path = FilePath::from("data/messages.jsonl");
        assert_eq!(path.as_path(), Path::new("data/messages.jsonl"));
        assert_eq!(path.as_str(), "data/messages.jsonl");
    }

    #[test]
    fn test_file_path_parent() {
        assert_eq!(
            FilePath::from("a/b/messages.jsonl").parent(),
            Some(FilePath::from("a/b"))
        );
        assert_eq!(FilePath::from("messages.jsonl").parent(), None);
    }

    #[test]
    fn test_file_path_escapes_base() {
        assert!(FilePath::from("../outside.jsonl").escapes_base());
        assert!(FilePath::from("data/../../outside.jsonl").escapes_base());
        assert!(FilePath::from("/etc/passwd").escapes_base());
        assert!(!FilePath::from("data/messages.jsonl").escapes_base());
    }

    #[test]
    fn test_file_path_display() {
        let path = FilePath::from(String::from("data/messages.jsonl"));
        assert_eq!(path.to_string(), "data/messages.jsonl");
    }
}
