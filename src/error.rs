use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while registering or running a directory watch
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("watch directory {0:?} does not exist")]
    MissingDirectory(PathBuf),

    #[error("watcher for {0:?} was already started")]
    AlreadyStarted(PathBuf),

    #[error("invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to register filesystem watch: {0}")]
    Notify(#[from] notify::Error),

    #[error("failed to list watch directory: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while writing to the clipboard
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("system clipboard is unavailable")]
    SystemUnavailable,

    #[error("failed to write to clipboard")]
    WriteError,
}

/// Errors that abort a turn-on attempt
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to create temp directory {path:?}: {source}")]
    TempDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to install shell bridge at {path:?}: {source}")]
    Bridge {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error("invalid alias '{0}': must start with a letter or underscore and contain only letters, digits or '_'")]
    InvalidAlias(String),

    #[error("copy and tee aliases must differ (both are '{0}')")]
    DuplicateAlias(String),

    #[error("failed to persist config: {0:#}")]
    Config(anyhow::Error),
}
