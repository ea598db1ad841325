//! File entry data structure
//!
//! A file entry is one open editor tab as captured from the host: the file it
//! shows and where the cursor or selection was. Entries are values; they are
//! never modified after capture.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Cursor or selection state of an editor at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start_line: i32,
    pub end_line: i32,
    pub offset: i32,
    pub length: i32,
    /// Selected text, if any
    pub text: Option<String>,
    /// True when there was only a cursor and nothing selected
    pub is_empty: bool,
}

impl Selection {
    /// A bare cursor at the given line and character offset.
    pub fn cursor(line: i32, offset: i32) -> Self {
        Self {
            start_line: line,
            end_line: line,
            offset,
            length: 0,
            text: None,
            is_empty: true,
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::cursor(0, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    file_name: String,
    full_path: String,
    selection: Selection,
}

impl FileEntry {
    pub fn new(file_name: impl Into<String>, full_path: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            full_path: full_path.into(),
            selection: Selection::default(),
        }
    }

    /// Entry whose display name is the last component of `full_path`.
    pub fn from_path(full_path: impl Into<String>) -> Self {
        let full_path = full_path.into();
        let file_name = full_path
            .rsplit(|c| c == '/' || c == '\\')
            .find(|part| !part.is_empty())
            .unwrap_or(full_path.as_str())
            .to_string();
        Self::new(file_name, full_path)
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Display name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Identity of the file within a workspace
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Two entries name the same file when their paths match, whatever their
    /// display names or cursor state.
    pub fn same_file(&self, other: &FileEntry) -> bool {
        self.full_path == other.full_path
    }

    /// Case-sensitive ordering on the display name only.
    pub fn cmp_by_name(&self, other: &FileEntry) -> Ordering {
        self.file_name.cmp(&other.file_name)
    }
}

/// Sort in place by display name. Entries with equal names keep their order.
pub fn sort_by_name(files: &mut [FileEntry]) {
    files.sort_by(FileEntry::cmp_by_name);
}

/// Copy of `files` sorted by display name, leaving the input untouched.
pub fn sorted_by_name(files: &[FileEntry]) -> Vec<FileEntry> {
    let mut sorted = files.to_vec();
    sort_by_name(&mut sorted);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_uses_last_component() {
        let entry = FileEntry::from_path("/work/src/main.rs");
        assert_eq!(entry.file_name(), "main.rs");
        assert_eq!(entry.full_path(), "/work/src/main.rs");

        let windows = FileEntry::from_path("C:\\work\\lib.rs");
        assert_eq!(windows.file_name(), "lib.rs");

        let bare = FileEntry::from_path("README");
        assert_eq!(bare.file_name(), "README");
    }

    #[test]
    fn test_same_file_ignores_name_and_cursor() {
        let a = FileEntry::new("a", "/p/a");
        let moved = FileEntry::new("renamed", "/p/a").with_selection(Selection::cursor(40, 812));
        let other = FileEntry::new("a", "/q/a");

        assert!(a.same_file(&moved));
        assert!(!a.same_file(&other));
        assert_ne!(a, moved);
    }

    #[test]
    fn test_sort_by_name_is_stable() {
        let files = vec![
            FileEntry::new("b", "/1/b"),
            FileEntry::new("a", "/a"),
            FileEntry::new("b", "/2/b"),
            FileEntry::new("B", "/B"),
        ];

        let sorted = sorted_by_name(&files);
        let paths: Vec<&str> = sorted.iter().map(|f| f.full_path()).collect();
        assert_eq!(paths, vec!["/B", "/a", "/1/b", "/2/b"]);

        // input untouched
        assert_eq!(files[0].full_path(), "/1/b");
    }

    #[test]
    fn test_selection_serializes_with_entry() {
        let entry = FileEntry::new("a.rs", "/p/a.rs").with_selection(Selection {
            start_line: 3,
            end_line: 5,
            offset: 120,
            length: 42,
            text: Some("fn main".to_string()),
            is_empty: false,
        });

        let json = serde_json::to_string(&entry).unwrap();
        let back: FileEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
        assert_eq!(back.selection().text.as_deref(), Some("fn main"));
    }
}
