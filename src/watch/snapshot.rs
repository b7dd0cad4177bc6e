use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

use super::FilePattern;

/// Names of matching files present in a directory at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirSnapshot {
    names: BTreeSet<String>,
}

impl DirSnapshot {
    /// List the regular files in `dir` whose names match `pattern`.
    /// Entries that vanish mid-listing or have non UTF-8 names are skipped.
    pub fn read(dir: &Path, pattern: &FilePattern) -> io::Result<Self> {
        let mut names = BTreeSet::new();

        for entry in fs::read_dir(dir)? {
            let Ok(entry) = entry else { continue };
            let Ok(file_type) = entry.file_type() else { continue };
            if !file_type.is_file() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                if pattern.matches(&name) {
                    names.insert(name);
                }
            }
        }

        Ok(Self { names })
    }

    /// Names present in `self` but not in `previous`, in sorted order
    pub fn added_since(&self, previous: &DirSnapshot) -> Vec<String> {
        self.names.difference(&previous.names).cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DirSnapshot {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
