//! Lifecycle controller: owns the config, the relay and at most one session.

use std::path::PathBuf;

use serde::Serialize;

use crate::bridge::Aliases;
use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::env_guard::Environment;
use crate::error::SetupError;
use crate::relay::{ClipboardRelay, NotificationStyle, Notifier, RelayOutcome};
use crate::session::{Session, resolve_root};
use crate::watch::WatchEvent;

/// Why [`Controller::wait`] returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wake {
    /// A watch event, or `None` when the watcher stopped on its own
    Event(Option<WatchEvent>),
    HideStatus,
}

/// Snapshot reported by the `status` command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub enabled: bool,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,
    pub copy_alias: String,
    pub tee_alias: String,
    pub notification: NotificationStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_preview: Option<String>,
}

pub struct Controller<C: Clipboard, N: Notifier> {
    config: Config,
    relay: ClipboardRelay<C, N>,
    env: Box<dyn Environment>,
    session: Option<Session>,
}

impl<C: Clipboard, N: Notifier> Controller<C, N> {
    pub fn new(config: Config, clipboard: C, notifier: N, env: Box<dyn Environment>) -> Self {
        let relay = ClipboardRelay::new(clipboard, notifier, config.relay_options());
        Self {
            config,
            relay,
            env,
            session: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn relay(&self) -> &ClipboardRelay<C, N> {
        &self.relay
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_on(&self) -> bool {
        self.session.is_some()
    }

    pub fn env(&self) -> &dyn Environment {
        self.env.as_ref()
    }

    /// Directory that holds session directories and bridge scripts
    pub fn root(&self) -> PathBuf {
        resolve_root(self.config.temp_directory.as_deref())
    }

    /// Start a fresh session, tearing down the current one first.
    /// On error the controller is left OFF with nothing on disk.
    pub fn turn_on(&mut self) -> Result<(), SetupError> {
        self.turn_off();

        let aliases = self.config.aliases()?;
        let root = self.root();

        let session = Session::open(&root, &aliases, self.env.as_mut())?;

        self.relay.set_options(self.config.relay_options());
        self.session = Some(session);
        Ok(())
    }

    /// Returns whether a session was started
    pub fn turn_on_if_enabled(&mut self) -> Result<bool, SetupError> {
        if !self.config.enabled {
            log::info!("Disabled in config, staying off");
            return Ok(false);
        }
        self.turn_on()?;
        Ok(true)
    }

    /// Stop the current session. Safe to call when already off.
    pub fn turn_off(&mut self) {
        self.relay.reset();
        if let Some(session) = self.session.take() {
            session.close(self.env.as_mut());
        }
    }

    /// Flip and persist `enabled`, then start or stop accordingly.
    /// Returns the new state.
    pub fn toggle(&mut self) -> Result<bool, SetupError> {
        let enabled = !self.config.enabled;

        if enabled {
            self.turn_on()?;
        } else {
            self.turn_off();
        }

        self.config.enabled = enabled;
        self.config.persist().map_err(SetupError::Config)?;
        log::info!("Now {}", if enabled { "enabled" } else { "disabled" });
        Ok(enabled)
    }

    /// Rename the copy and/or tee alias, persist, and restart the session so
    /// the shell bridge is regenerated.
    pub fn change_alias(&mut self, copy: Option<String>, tee: Option<String>) -> Result<Aliases, SetupError> {
        let aliases = Aliases::new(
            copy.unwrap_or_else(|| self.config.copy_alias.clone()),
            tee.unwrap_or_else(|| self.config.tee_alias.clone()),
        )?;

        self.config.copy_alias = aliases.copy.clone();
        self.config.tee_alias = aliases.tee.clone();
        self.config.persist().map_err(SetupError::Config)?;

        if self.is_on() {
            self.turn_on()?;
        }

        log::info!("Aliases changed to {} / {}", aliases.copy, aliases.tee);
        Ok(aliases)
    }

    /// Wait for the next watch event or for the status indicator to expire
    pub async fn wait(&mut self) -> Wake {
        let relay = &self.relay;
        let session = self.session.as_mut();
        let next_event = async move {
            match session {
                Some(session) => session.next_event().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            event = next_event => Wake::Event(event),
            _ = relay.hide_due() => Wake::HideStatus,
        }
    }

    pub async fn process(&mut self, wake: Wake) -> Option<RelayOutcome> {
        match wake {
            Wake::Event(Some(event)) => self.dispatch(&event).await,
            Wake::Event(None) => {
                log::error!("Watcher stopped unexpectedly, turning off");
                self.turn_off();
                None
            }
            Wake::HideStatus => {
                self.relay.hide_status();
                None
            }
        }
    }

    /// Relay an event if it belongs to the active session
    pub async fn dispatch(&mut self, event: &WatchEvent) -> Option<RelayOutcome> {
        let owned = self.session.as_ref().is_some_and(|s| s.owns(event));
        if !owned {
            log::debug!("Ignoring {:?} from another instance", event.path());
            return None;
        }

        Some(self.relay.handle(event).await)
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            enabled: self.config.enabled,
            active: self.is_on(),
            instance: self.session.as_ref().map(|s| s.instance().to_string()),
            directory: self.session.as_ref().map(|s| s.dir().to_path_buf()),
            hook: self.session.as_ref().map(|s| s.hook().to_string()),
            copy_alias: self.config.copy_alias.clone(),
            tee_alias: self.config.tee_alias.clone(),
            notification: self.config.notification,
            last_preview: self.relay.last_preview().map(str::to_string),
        }
    }
}

impl<C: Clipboard, N: Notifier> Drop for Controller<C, N> {
    fn drop(&mut self) {
        self.turn_off();
    }
}
