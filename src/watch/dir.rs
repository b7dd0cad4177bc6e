use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use notify::event::ModifyKind;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{DirSnapshot, FilePattern, WatchEvent};
use crate::error::WatchError;

/// Watches one directory for newly created files using OS-level notifications
pub struct DirWatcher {
    dir: PathBuf,
    pattern: FilePattern,
    started: bool,
    task: Option<JoinHandle<()>>,
}

impl DirWatcher {
    pub fn new(dir: PathBuf, pattern: FilePattern) -> Self {
        Self {
            dir,
            pattern,
            started: false,
            task: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Register the OS watch and return the event stream.
    ///
    /// Files already present are never reported. A watcher can only be
    /// started once; stopping it ends the stream for good.
    pub fn start(&mut self) -> Result<WatchEvents, WatchError> {
        if self.started {
            return Err(WatchError::AlreadyStarted(self.dir.clone()));
        }
        if !self.dir.is_dir() {
            return Err(WatchError::MissingDirectory(self.dir.clone()));
        }

        let (wake_tx, wake_rx) = mpsc::unbounded_channel::<()>();
        let pattern = self.pattern.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    let paths_match =
                        event.paths.iter().any(|p| pattern.matches_path(p)) || event.paths.is_empty();

                    if is_creation(&event.kind) && paths_match {
                        let _ = wake_tx.send(());
                    }
                }
            },
            Config::default(),
        )?;
        watcher.watch(&self.dir, RecursiveMode::NonRecursive)?;

        // Taken after the watch is registered so nothing created in between is lost
        let initial = DirSnapshot::read(&self.dir, &self.pattern)?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let dir = self.dir.clone();
        let pattern = self.pattern.clone();

        let task = tokio::spawn(async move {
            relist_on_wake(watcher, dir, pattern, initial, wake_rx, event_tx).await;
        });

        log::debug!("Watching {:?} for {}", self.dir, self.pattern.as_str());
        self.started = true;
        self.task = Some(task);

        Ok(WatchEvents { rx: event_rx })
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            log::debug!("Stopped watching {:?}", self.dir);
        }
    }
}

impl Drop for DirWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn is_creation(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(_))
    )
}

/// Re-list the directory on every wake-up and emit names new since the last listing
async fn relist_on_wake(
    _watcher: RecommendedWatcher,
    dir: PathBuf,
    pattern: FilePattern,
    mut snapshot: DirSnapshot,
    mut wake_rx: mpsc::UnboundedReceiver<()>,
    event_tx: mpsc::UnboundedSender<WatchEvent>,
) {
    while wake_rx.recv().await.is_some() {
        // Coalesce a burst of notifications into one listing
        while wake_rx.try_recv().is_ok() {}

        let current = match DirSnapshot::read(&dir, &pattern) {
            Ok(current) => current,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Watch directory {:?} disappeared, stopping", dir);
                return;
            }
            Err(e) => {
                log::warn!("Failed to list {:?}: {}", dir, e);
                continue;
            }
        };

        for file_name in current.added_since(&snapshot) {
            if event_tx.send(WatchEvent::new(dir.clone(), file_name)).is_err() {
                return; // Receiver dropped
            }
        }

        snapshot = current;
    }
}

/// Lazy stream of creation events from a [`DirWatcher`]
pub struct WatchEvents {
    rx: mpsc::UnboundedReceiver<WatchEvent>,
}

impl Stream for WatchEvents {
    type Item = WatchEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
