//! One activation of the drop-box: instance id, session directory, watcher,
//! installed shell bridge and exported environment.
//!
//! Sessions are scoped by directory: `<root>/<instance-id>` holds only this
//! instance's drop files, so an event belongs to the session exactly when it
//! was raised for that directory. File names carry no instance token.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use futures::StreamExt;

use crate::bridge::{Aliases, DROP_FILE_PATTERN, InstalledBridge};
use crate::env_guard::{DIR_VAR, EnvGuard, Environment, HOOK_VAR, INSTANCE_VAR};
use crate::error::SetupError;
use crate::watch::{DirWatcher, FilePattern, WatchEvent, WatchEvents};

const INSTANCE_ID_LEN: usize = 12;

/// Short random token identifying one session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceId(String);

impl InstanceId {
    /// 12 lowercase hex characters from a random v4 UUID
    pub fn generate() -> Self {
        let simple = uuid::Uuid::new_v4().simple().to_string();
        Self(simple[..INSTANCE_ID_LEN].to_string())
    }

    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scratch root for session directories: the configured override, else a
/// per-user directory under the system temp dir.
pub fn resolve_root(override_dir: Option<&Path>) -> PathBuf {
    match override_dir {
        Some(dir) => std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf()),
        None => std::env::temp_dir().join(format!("termclip-{}", current_uid())),
    }
}

pub(crate) fn current_uid() -> u32 {
    nix::unistd::getuid().as_raw()
}

/// An active session
pub struct Session {
    instance: InstanceId,
    dir: PathBuf,
    watcher: DirWatcher,
    events: WatchEvents,
    bridge: InstalledBridge,
    env: EnvGuard,
}

impl Session {
    /// Create the session directory, start watching it, install the shell
    /// bridge and export the session variables. On failure everything done
    /// so far is undone.
    pub fn open(root: &Path, aliases: &Aliases, env: &mut dyn Environment) -> Result<Self, SetupError> {
        aliases.validate()?;

        let instance = InstanceId::generate();
        let dir = root.join(instance.as_str());

        fs::create_dir_all(&dir).map_err(|source| SetupError::TempDirectory {
            path: dir.clone(),
            source,
        })?;

        let pattern = FilePattern::new(DROP_FILE_PATTERN)?;
        let mut watcher = DirWatcher::new(dir.clone(), pattern);
        let events = match watcher.start() {
            Ok(events) => events,
            Err(e) => {
                remove_dir(&dir);
                return Err(e.into());
            }
        };

        let bridge = match InstalledBridge::install(root, &instance, &dir, aliases) {
            Ok(bridge) => bridge,
            Err(e) => {
                watcher.stop();
                remove_dir(&dir);
                return Err(e);
            }
        };

        let mut guard = EnvGuard::new(vec![
            (INSTANCE_VAR.to_string(), instance.to_string()),
            (DIR_VAR.to_string(), dir.to_string_lossy().into_owned()),
            (HOOK_VAR.to_string(), bridge.hook().to_string()),
        ]);
        guard.apply(env);

        log::info!("Session {} watching {:?}", instance, dir);

        Ok(Self {
            instance,
            dir,
            watcher,
            events,
            bridge,
            env: guard,
        })
    }

    pub fn instance(&self) -> &InstanceId {
        &self.instance
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn hook(&self) -> &str {
        self.bridge.hook()
    }

    pub fn bridge_path(&self) -> &Path {
        self.bridge.script_path()
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_running()
    }

    /// Whether an event was raised for this session's directory
    pub fn owns(&self, event: &WatchEvent) -> bool {
        event.dir == self.dir
    }

    /// Next raw event from the watcher, `None` once the watcher has stopped
    pub async fn next_event(&mut self) -> Option<WatchEvent> {
        self.events.next().await
    }

    /// Stop watching, remove the directory and bridge, restore the environment
    pub fn close(mut self, env: &mut dyn Environment) {
        self.watcher.stop();
        self.env.revert(env);
        self.bridge.uninstall();
        remove_dir(&self.dir);
        log::info!("Session {} closed", self.instance);
    }
}

fn remove_dir(dir: &Path) {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove {:?}: {}", dir, e),
    }
}
