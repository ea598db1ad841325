//! Session data structure
//!
//! A session is a named set of files plus two behaviour flags. The name lives
//! in the owning [`SessionRegistry`](crate::SessionRegistry); the session only
//! knows its files and how they react to the live tab set:
//!
//! - a *live* session follows the open tabs whenever they are observed
//! - a *snapshot* keeps its files until an update explicitly replaces them
//!
//! Files are stored in the order the host reported them. Alphabetical order
//! is applied on read only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use tabset_tabs::{sorted_by_name, FileEntry};

/// The two user-facing switches of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFlags {
    /// Restore and list files sorted by name
    pub keep_alphabetical: bool,
    /// Freeze the file list against live tab changes
    pub is_snapshot: bool,
}

impl SessionFlags {
    pub fn new(keep_alphabetical: bool, is_snapshot: bool) -> Self {
        Self {
            keep_alphabetical,
            is_snapshot,
        }
    }
}

/// What replacing a session's files with a candidate list would change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDiff {
    pub to_add: isize,
    pub to_delete: isize,
    pub identical: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    is_snapshot: bool,
    keep_alphabetical: bool,
    files: Vec<FileEntry>,
    /// Path of the focused tab when the files were captured
    #[serde(default)]
    active_file: Option<String>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    updated_at: DateTime<Utc>,
}

impl Session {
    /// An empty live session.
    pub fn new() -> Self {
        let now = Utc::now();

        Self {
            is_snapshot: false,
            keep_alphabetical: false,
            files: Vec::new(),
            active_file: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn from_parts(
        flags: SessionFlags,
        files: Vec<FileEntry>,
        active_file: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            is_snapshot: flags.is_snapshot,
            keep_alphabetical: flags.keep_alphabetical,
            files,
            active_file,
            created_at,
            updated_at,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        self.is_snapshot
    }

    pub fn keep_alphabetical(&self) -> bool {
        self.keep_alphabetical
    }

    pub fn flags(&self) -> SessionFlags {
        SessionFlags::new(self.keep_alphabetical, self.is_snapshot)
    }

    /// Files in stored order.
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn active_file(&self) -> Option<&str> {
        self.active_file.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Copy of the files, sorted by name when the session keeps alphabetical
    /// order. Computed on every call.
    pub fn ordered_files(&self) -> Vec<FileEntry> {
        if self.keep_alphabetical {
            sorted_by_name(&self.files)
        } else {
            self.files.clone()
        }
    }

    /// Display names in read order.
    pub fn file_names(&self) -> Vec<String> {
        self.ordered_files()
            .iter()
            .map(|f| f.file_name().to_string())
            .collect()
    }

    /// Fill a freshly created session.
    pub fn create_session_data(
        &mut self,
        keep_alphabetical: bool,
        is_snapshot: bool,
        files: Vec<FileEntry>,
    ) {
        self.keep_alphabetical = keep_alphabetical;
        self.is_snapshot = is_snapshot;
        self.files = files;
        self.touch();
    }

    /// Follow the live tab set. Ignored for snapshots and for an empty
    /// tab set; returns whether the files were replaced.
    pub fn update_file_list(&mut self, new_files: Vec<FileEntry>) -> bool {
        if self.is_snapshot || new_files.is_empty() {
            return false;
        }

        self.files = new_files;
        self.touch();
        true
    }

    /// Settle the files of a session being updated from `original_files`
    /// and the currently open `new_files`. Returns whether `new_files` won.
    ///
    /// Precedence: an empty `new_files` always keeps the original; a live
    /// session takes `new_files`; a snapshot takes them only when
    /// `update_snapshot` is set.
    pub fn update_session_data(
        &mut self,
        keep_alphabetical: bool,
        is_snapshot: bool,
        original_files: Vec<FileEntry>,
        new_files: Vec<FileEntry>,
        update_snapshot: bool,
    ) -> bool {
        self.keep_alphabetical = keep_alphabetical;
        self.is_snapshot = is_snapshot;

        let adopt_new = if new_files.is_empty() {
            false
        } else if !is_snapshot {
            true
        } else {
            update_snapshot
        };

        self.files = if adopt_new { new_files } else { original_files };
        self.touch();
        adopt_new
    }

    /// Change the flags only.
    pub fn update_flags(&mut self, keep_alphabetical: bool, is_snapshot: bool) {
        self.keep_alphabetical = keep_alphabetical;
        self.is_snapshot = is_snapshot;
        self.touch();
    }

    pub fn set_active_file(&mut self, active_file: Option<String>) {
        self.active_file = active_file;
    }

    /// Candidate files that would be new to this session.
    pub fn num_to_be_added(&self, new_files: &[FileEntry]) -> isize {
        new_files.len() as isize - count_matching(&self.files, new_files) as isize
    }

    /// Stored files that a replacement by `new_files` would drop.
    pub fn num_to_be_deleted(&self, new_files: &[FileEntry]) -> isize {
        self.files.len() as isize - count_matching(&self.files, new_files) as isize
    }

    /// Same length and every stored file matched. Counts matches per path
    /// pair, so lists with repeated paths can compare equal while holding
    /// different path sets.
    pub fn is_identical(&self, new_files: &[FileEntry]) -> bool {
        self.files.len() == new_files.len()
            && count_matching(&self.files, new_files) == self.files.len()
    }

    pub fn diff(&self, new_files: &[FileEntry]) -> SessionDiff {
        let matching = count_matching(&self.files, new_files);

        SessionDiff {
            to_add: new_files.len() as isize - matching as isize,
            to_delete: self.files.len() as isize - matching as isize,
            identical: self.files.len() == new_files.len() && matching == self.files.len(),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of (candidate, existing) pairs that share a path.
///
/// Same result as comparing every candidate against every existing entry;
/// a repeated path in `existing` counts once per repetition.
pub fn count_matching(existing: &[FileEntry], candidate: &[FileEntry]) -> usize {
    let mut by_path: HashMap<&str, usize> = HashMap::with_capacity(existing.len());
    for file in existing {
        *by_path.entry(file.full_path()).or_insert(0) += 1;
    }

    candidate
        .iter()
        .map(|file| by_path.get(file.full_path()).copied().unwrap_or(0))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, path: &str) -> FileEntry {
        FileEntry::new(name, path)
    }

    fn cab() -> Vec<FileEntry> {
        vec![file("c", "cpath"), file("a", "apath"), file("b", "bpath")]
    }

    fn names(files: &[FileEntry]) -> Vec<&str> {
        files.iter().map(|f| f.file_name()).collect()
    }

    #[test]
    fn test_new_session() {
        let session = Session::new();
        assert!(!session.is_snapshot());
        assert!(!session.keep_alphabetical());
        assert!(session.files().is_empty());
        assert!(session.ordered_files().is_empty());
    }

    #[test]
    fn test_alphabetical_read_order() {
        let mut session = Session::new();
        session.create_session_data(true, false, cab());

        assert_eq!(names(&session.ordered_files()), vec!["a", "b", "c"]);
        // storage keeps insertion order
        assert_eq!(names(session.files()), vec!["c", "a", "b"]);

        session.update_flags(false, false);
        assert_eq!(names(&session.ordered_files()), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_ordered_files_reflects_later_changes() {
        let mut session = Session::new();
        session.create_session_data(true, false, cab());
        assert_eq!(names(&session.ordered_files()), vec!["a", "b", "c"]);

        session.update_file_list(vec![file("z", "zpath"), file("m", "mpath")]);
        assert_eq!(names(&session.ordered_files()), vec!["m", "z"]);
    }

    #[test]
    fn test_update_file_list_blocked_for_snapshot() {
        let mut session = Session::new();
        session.create_session_data(false, true, cab());

        assert!(!session.update_file_list(vec![file("d", "dpath")]));
        assert_eq!(session.files(), cab().as_slice());
    }

    #[test]
    fn test_update_file_list_ignores_empty() {
        for is_snapshot in [false, true] {
            let mut session = Session::new();
            session.create_session_data(false, is_snapshot, cab());

            assert!(!session.update_file_list(Vec::new()));
            assert_eq!(session.files(), cab().as_slice());
        }
    }

    #[test]
    fn test_update_file_list_follows_live_tabs() {
        let mut session = Session::new();
        session.create_session_data(false, false, cab());

        let live = vec![file("d", "dpath")];
        assert!(session.update_file_list(live.clone()));
        assert_eq!(session.files(), live.as_slice());
    }

    #[test]
    fn test_diff_counts() {
        let mut session = Session::new();
        session.create_session_data(false, false, cab());

        let candidate = vec![
            file("d", "dpath"),
            file("a", "apath"),
            file("e", "epath"),
            file("f", "fpath"),
            file("g", "gpath"),
        ];

        assert_eq!(session.num_to_be_added(&candidate), 4);
        assert_eq!(session.num_to_be_deleted(&candidate), 2);
        assert!(!session.is_identical(&candidate));
        assert_eq!(
            session.diff(&candidate),
            SessionDiff {
                to_add: 4,
                to_delete: 2,
                identical: false
            }
        );
    }

    #[test]
    fn test_diff_identities() {
        let mut session = Session::new();
        session.create_session_data(false, false, cab());

        let candidates = vec![
            Vec::new(),
            cab(),
            vec![file("x", "apath"), file("y", "ypath")],
            vec![file("a", "apath"), file("a", "apath"), file("q", "qpath")],
        ];

        for candidate in candidates {
            let matching = count_matching(session.files(), &candidate) as isize;
            assert_eq!(
                session.num_to_be_added(&candidate) + matching,
                candidate.len() as isize
            );
            assert_eq!(
                session.num_to_be_deleted(&candidate) + matching,
                session.file_count() as isize
            );
        }
    }

    #[test]
    fn test_identical_with_own_files() {
        let mut session = Session::new();
        session.create_session_data(true, false, cab());
        assert!(session.is_identical(&session.files().to_vec()));

        // reordered and renamed entries still match by path
        let shuffled = vec![file("B", "bpath"), file("C", "cpath"), file("A", "apath")];
        assert!(session.is_identical(&shuffled));
    }

    #[test]
    fn test_identical_counts_path_pairs() {
        let mut session = Session::new();
        session.create_session_data(false, false, vec![file("a", "apath"), file("a", "apath")]);

        // one candidate path matches twice, so the lists compare identical
        let candidate = vec![file("a", "apath"), file("b", "bpath")];
        assert_eq!(count_matching(session.files(), &candidate), 2);
        assert!(session.is_identical(&candidate));
        assert_eq!(session.num_to_be_added(&candidate), 0);
    }

    #[test]
    fn test_count_matching_against_nested_loop() {
        let existing = vec![file("a", "1"), file("b", "2"), file("c", "2"), file("d", "3")];
        let candidate = vec![file("x", "2"), file("y", "4"), file("z", "1"), file("w", "2")];

        let nested = candidate
            .iter()
            .map(|c| existing.iter().filter(|e| e.same_file(c)).count())
            .sum::<usize>();

        assert_eq!(count_matching(&existing, &candidate), nested);
        assert_eq!(nested, 5);
    }

    #[test]
    fn test_update_session_data_snapshot_refresh() {
        let original = vec![file("b", "cpath"), file("a", "apath"), file("b", "bpath")];
        let open_tabs = vec![file("open1", "u1path"), file("open2", "u2path")];

        let mut session = Session::new();
        session.create_session_data(false, true, original.clone());
        let adopted =
            session.update_session_data(false, true, original.clone(), open_tabs.clone(), true);

        assert!(adopted);
        assert_eq!(session.files(), open_tabs.as_slice());
    }

    #[test]
    fn test_update_session_data_snapshot_kept() {
        let original = vec![file("b", "cpath"), file("a", "apath"), file("b", "bpath")];
        let open_tabs = vec![file("open1", "u1path"), file("open2", "u2path")];

        let mut session = Session::new();
        session.create_session_data(false, true, original.clone());
        let adopted = session.update_session_data(false, true, original.clone(), open_tabs, false);

        assert!(!adopted);
        assert_eq!(session.files(), original.as_slice());
    }

    #[test]
    fn test_update_session_data_empty_keeps_original() {
        let original = cab();

        for (is_snapshot, update_snapshot) in [(false, true), (false, false), (true, true)] {
            let mut session = Session::new();
            let adopted = session.update_session_data(
                false,
                is_snapshot,
                original.clone(),
                Vec::new(),
                update_snapshot,
            );
            assert!(!adopted);
            assert_eq!(session.files(), original.as_slice());
        }
    }

    #[test]
    fn test_update_session_data_live_follows_tabs() {
        let open_tabs = vec![file("open1", "u1path")];

        let mut session = Session::new();
        let adopted = session.update_session_data(true, false, cab(), open_tabs.clone(), false);

        assert!(adopted);
        assert!(session.keep_alphabetical());
        assert_eq!(session.files(), open_tabs.as_slice());
    }

    #[test]
    fn test_update_flags_keeps_files() {
        let mut session = Session::new();
        session.create_session_data(false, false, cab());
        session.update_flags(true, true);

        assert_eq!(session.flags(), SessionFlags::new(true, true));
        assert_eq!(session.files(), cab().as_slice());
    }
}
