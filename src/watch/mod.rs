//! Creation-only directory watching.
//!
//! A [`DirWatcher`] turns noisy OS notifications into a stream of
//! [`WatchEvent`]s, one per newly created file whose name matches a
//! [`FilePattern`]. The directory listing is the source of truth: every
//! notification triggers a re-list that is diffed against the previous
//! [`DirSnapshot`].

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::WatchError;

pub mod dir;
pub mod snapshot;

pub use dir::{DirWatcher, WatchEvents};
pub use snapshot::DirSnapshot;

/// A file appeared in a watched directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub dir: PathBuf,
    pub file_name: String,
}

impl WatchEvent {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    /// Full path of the file that triggered the event
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Glob over file names supporting `*` and `?`
#[derive(Debug, Clone)]
pub struct FilePattern {
    glob: String,
    regex: Regex,
}

impl FilePattern {
    pub fn new(glob: &str) -> Result<Self, WatchError> {
        let mut source = String::with_capacity(glob.len() + 8);
        source.push('^');
        for c in glob.chars() {
            match c {
                '*' => source.push_str(".*"),
                '?' => source.push('.'),
                other => source.push_str(&regex::escape(&other.to_string())),
            }
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|source| WatchError::InvalidPattern {
            pattern: glob.to_string(),
            source,
        })?;

        Ok(Self {
            glob: glob.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.glob
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }

    /// Match against the final component of a path
    pub fn matches_path(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.matches(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_matches_extension() {
        let pattern = FilePattern::new("*.tmp").unwrap();
        assert!(pattern.matches("17000000001234.tmp"));
        assert!(pattern.matches(".tmp"));
        assert!(!pattern.matches("17000000001234.tmp.part"));
        assert!(!pattern.matches("notes.txt"));
    }

    #[test]
    fn test_pattern_escapes_regex_metacharacters() {
        let pattern = FilePattern::new("a+b.tmp").unwrap();
        assert!(pattern.matches("a+b.tmp"));
        assert!(!pattern.matches("aab.tmp"));
        assert!(!pattern.matches("a+bxtmp"));
    }

    #[test]
    fn test_pattern_question_mark_matches_one_char() {
        let pattern = FilePattern::new("?.tmp").unwrap();
        assert!(pattern.matches("1.tmp"));
        assert!(!pattern.matches("12.tmp"));
    }

    #[test]
    fn test_pattern_matches_path_uses_file_name_only() {
        let pattern = FilePattern::new("*.tmp").unwrap();
        assert!(pattern.matches_path(Path::new("/var/tmp.d/x.tmp")));
        assert!(!pattern.matches_path(Path::new("/var/x.tmp/y.txt")));
    }

    #[test]
    fn test_watch_event_path_joins_dir_and_name() {
        let event = WatchEvent::new("/tmp/termclip/abc", "1.tmp");
        assert_eq!(event.path(), PathBuf::from("/tmp/termclip/abc/1.tmp"));
    }
}
