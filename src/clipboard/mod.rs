//! Clipboard backends.
//!
//! - System clipboard (via arboard)
//! - OSC 52 escape sequences (for remote terminals and WSL)
//! - Auto mode (system with OSC 52 fallback)

mod memory;
mod osc52;
mod system;

use serde::{Deserialize, Serialize};

pub use crate::error::ClipboardError;
pub use memory::MemoryClipboard;
pub use osc52::{Osc52Clipboard, encode_osc52};
pub use system::SystemClipboard;

pub type ClipboardResult = Result<(), ClipboardError>;

/// Destination for copied text
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> ClipboardResult;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardBackend {
    #[default]
    Auto,
    System,
    Osc52,
}

/// The clipboard selected by the `clipboard_backend` setting
pub struct HostClipboard {
    backend: ClipboardBackend,
    system: SystemClipboard,
    osc52: Osc52Clipboard<std::io::Stdout>,
}

impl HostClipboard {
    pub fn new(backend: ClipboardBackend) -> Self {
        Self {
            backend,
            system: SystemClipboard::new(),
            osc52: Osc52Clipboard::stdout(),
        }
    }

    pub fn backend(&self) -> ClipboardBackend {
        self.backend
    }
}

impl Clipboard for HostClipboard {
    fn set_text(&mut self, text: &str) -> ClipboardResult {
        match self.backend {
            ClipboardBackend::System => self.system.set_text(text),
            ClipboardBackend::Osc52 => self.osc52.set_text(text),
            ClipboardBackend::Auto => self.system.set_text(text).or_else(|e| {
                log::debug!("System clipboard failed ({}), falling back to OSC 52", e);
                self.osc52.set_text(text)
            }),
        }
    }
}
