use std::io::{self, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::style::Print;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use serde::{Deserialize, Serialize};

/// How a copy is announced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStyle {
    /// One line per copy, left on screen
    Popup,
    /// A single status line that hides itself after a delay
    #[default]
    StatusBar,
}

/// Surface that shows copy notifications to the user
pub trait Notifier {
    fn popup(&mut self, message: &str);
    fn show_status(&mut self, text: &str, tooltip: &str);
    fn hide_status(&mut self);
    fn error(&mut self, message: &str);
}

/// Notifier writing to the daemon's terminal
pub struct TerminalNotifier<W: Write> {
    out: W,
    status_visible: bool,
}

impl TerminalNotifier<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> TerminalNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            status_visible: false,
        }
    }

    fn clear_status(&mut self) -> io::Result<()> {
        if self.status_visible {
            queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
            self.status_visible = false;
        }
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.clear_status()?;
        queue!(self.out, Print(line), Print("\n"))?;
        self.out.flush()
    }

    fn write_status(&mut self, text: &str) -> io::Result<()> {
        self.clear_status()?;
        queue!(self.out, Print(text))?;
        self.status_visible = true;
        self.out.flush()
    }
}

impl<W: Write> Notifier for TerminalNotifier<W> {
    fn popup(&mut self, message: &str) {
        if let Err(e) = self.write_line(message) {
            log::warn!("Failed to show notification: {}", e);
        }
    }

    fn show_status(&mut self, text: &str, _tooltip: &str) {
        if let Err(e) = self.write_status(text) {
            log::warn!("Failed to update status line: {}", e);
        }
    }

    fn hide_status(&mut self) {
        if let Err(e) = self.clear_status().and_then(|_| self.out.flush()) {
            log::warn!("Failed to clear status line: {}", e);
        }
    }

    fn error(&mut self, message: &str) {
        if let Err(e) = self.write_line(&format!("termclip: {}", message)) {
            log::warn!("Failed to show error: {}", e);
        }
    }
}

/// Something a [`RecordingNotifier`] was asked to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Popup(String),
    Status { text: String, tooltip: String },
    Hidden,
    Error(String),
}

/// Keeps every notification in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    history: Vec<Notification>,
    status: Option<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[Notification] {
        &self.history
    }

    /// Text currently shown in the status indicator
    pub fn visible_status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.history
            .iter()
            .filter_map(|n| match n {
                Notification::Error(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn popup(&mut self, message: &str) {
        self.history.push(Notification::Popup(message.to_string()));
    }

    fn show_status(&mut self, text: &str, tooltip: &str) {
        self.status = Some(text.to_string());
        self.history.push(Notification::Status {
            text: text.to_string(),
            tooltip: tooltip.to_string(),
        });
    }

    fn hide_status(&mut self) {
        self.status = None;
        self.history.push(Notification::Hidden);
    }

    fn error(&mut self, message: &str) {
        self.history.push(Notification::Error(message.to_string()));
    }
}
