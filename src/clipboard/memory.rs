use super::{Clipboard, ClipboardError, ClipboardResult};

/// Records every write instead of touching a real clipboard
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: Vec<String>,
    failing: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose writes always fail
    pub fn failing() -> Self {
        Self {
            writes: Vec::new(),
            failing: true,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.writes.last().map(String::as_str)
    }

    pub fn writes(&self) -> &[String] {
        &self.writes
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> ClipboardResult {
        if self.failing {
            return Err(ClipboardError::WriteError);
        }
        self.writes.push(text.to_string());
        Ok(())
    }
}
