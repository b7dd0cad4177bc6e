use arboard::Clipboard as Arboard;

use super::{Clipboard, ClipboardError, ClipboardResult};

/// System clipboard via arboard.
///
/// The handle is created on first use and kept for the life of the daemon:
/// on X11 the copied text is only served while the owning handle exists.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Option<Arboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> ClipboardResult {
        if self.handle.is_none() {
            self.handle = Some(Arboard::new().map_err(|_| ClipboardError::SystemUnavailable)?);
        }

        let result = match self.handle.as_mut() {
            Some(handle) => handle.set_text(text),
            None => return Err(ClipboardError::SystemUnavailable),
        };

        if result.is_err() {
            // Drop the handle so the next copy reconnects
            self.handle = None;
            return Err(ClipboardError::WriteError);
        }
        Ok(())
    }
}
