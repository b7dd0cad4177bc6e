//! OSC 52 clipboard backend
//!
//! Sets the clipboard of the terminal the daemon runs in via an escape
//! sequence; works over SSH, inside tmux and under WSL.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::io::{self, Write};

use super::{Clipboard, ClipboardError, ClipboardResult};

pub struct Osc52Clipboard<W: Write> {
    out: W,
}

impl Osc52Clipboard<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Clipboard for Osc52Clipboard<W> {
    fn set_text(&mut self, text: &str) -> ClipboardResult {
        self.out
            .write_all(encode_osc52(text).as_bytes())
            .map_err(|_| ClipboardError::WriteError)?;
        self.out.flush().map_err(|_| ClipboardError::WriteError)
    }
}

/// Format: `\x1b]52;c;{base64}\x07`
pub fn encode_osc52(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}
