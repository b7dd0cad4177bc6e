//! Forwards drop file contents to the clipboard and announces each copy.

use std::time::Duration;

use crate::clipboard::Clipboard;
use crate::watch::WatchEvent;

pub mod hide_timer;
pub mod notifier;

pub use hide_timer::HideTimer;
pub use notifier::{
    Notification, NotificationStyle, Notifier, RecordingNotifier, TerminalNotifier,
};

pub const DEFAULT_PREVIEW_LENGTH: usize = 40;
pub const DEFAULT_HIDE_DELAY: Duration = Duration::from_millis(3000);

const PREVIEW_PREFIX: &str = "📋: ";

#[derive(Debug, Clone, PartialEq)]
pub struct RelayOptions {
    pub style: NotificationStyle,
    pub preview_length: usize,
    pub hide_delay: Duration,
    /// Shown alongside the status text, e.g. "toclip: copied to clipboard"
    pub tooltip: String,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            style: NotificationStyle::default(),
            preview_length: DEFAULT_PREVIEW_LENGTH,
            hide_delay: DEFAULT_HIDE_DELAY,
            tooltip: String::from("copied to clipboard"),
        }
    }
}

/// What happened to one watch event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Copied { preview: String },
    /// The file could not be read; nothing was copied
    Skipped,
    ClipboardFailed,
}

pub struct ClipboardRelay<C: Clipboard, N: Notifier> {
    clipboard: C,
    notifier: N,
    options: RelayOptions,
    hide_timer: HideTimer,
    last_preview: Option<String>,
}

impl<C: Clipboard, N: Notifier> ClipboardRelay<C, N> {
    pub fn new(clipboard: C, notifier: N, options: RelayOptions) -> Self {
        Self {
            clipboard,
            notifier,
            options,
            hide_timer: HideTimer::new(),
            last_preview: None,
        }
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn options(&self) -> &RelayOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RelayOptions) {
        self.options = options;
    }

    pub fn hide_timer(&self) -> &HideTimer {
        &self.hide_timer
    }

    /// Preview of the most recent successful copy
    pub fn last_preview(&self) -> Option<&str> {
        self.last_preview.as_deref()
    }

    /// Read the drop file behind `event` and copy its trimmed content.
    /// The file itself is left in place.
    pub async fn handle(&mut self, event: &WatchEvent) -> RelayOutcome {
        let path = event.path();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Skipping {:?}: {}", path, e);
                return RelayOutcome::Skipped;
            }
        };

        log::debug!("Read {} bytes from {:?}", content.len(), path);
        self.relay_text(&content)
    }

    /// Copy `raw` (trimmed) and show a preview of it
    pub fn relay_text(&mut self, raw: &str) -> RelayOutcome {
        let text = raw.trim();

        if let Err(e) = self.clipboard.set_text(text) {
            log::error!("Clipboard write failed: {}", e);
            self.notifier.error(&e.to_string());
            return RelayOutcome::ClipboardFailed;
        }

        let preview = preview(text, self.options.preview_length);
        let message = format!("{}{}", PREVIEW_PREFIX, preview);

        match self.options.style {
            NotificationStyle::Popup => self.notifier.popup(&message),
            NotificationStyle::StatusBar => {
                self.notifier.show_status(&message, &self.options.tooltip);
                self.hide_timer.arm(self.options.hide_delay);
            }
        }

        self.last_preview = Some(preview.clone());
        RelayOutcome::Copied { preview }
    }

    /// Resolves when the status indicator is due to be hidden
    pub async fn hide_due(&self) {
        self.hide_timer.expired().await
    }

    /// Hide the status indicator and disarm the timer
    pub fn hide_status(&mut self) {
        self.hide_timer.cancel();
        self.notifier.hide_status();
    }

    /// Teardown: cancel a pending hide and clear anything still shown
    pub fn reset(&mut self) {
        if self.hide_timer.is_armed() {
            self.hide_status();
        }
    }
}

/// One-line summary of copied text.
///
/// ANSI escapes are stripped and each run of `\r`, `\n` or `\t` becomes a
/// single space. Text longer than `max_chars` characters is cut to exactly
/// `max_chars` characters followed by `...`.
pub fn preview(text: &str, max_chars: usize) -> String {
    // Collapse first: stripping removes bare C0 controls such as `\t`
    let mut collapsed = String::with_capacity(text.len());
    let mut in_break = false;
    for c in text.chars() {
        if matches!(c, '\r' | '\n' | '\t') {
            if !in_break {
                collapsed.push(' ');
                in_break = true;
            }
        } else {
            collapsed.push(c);
            in_break = false;
        }
    }
    let collapsed = strip_ansi_escapes::strip_str(&collapsed);

    if collapsed.chars().count() > max_chars {
        let mut truncated: String = collapsed.chars().take(max_chars).collect();
        truncated.push_str("...");
        truncated
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use std::fs;
    use tempfile::TempDir;

    fn relay(style: NotificationStyle) -> ClipboardRelay<MemoryClipboard, RecordingNotifier> {
        ClipboardRelay::new(
            MemoryClipboard::new(),
            RecordingNotifier::new(),
            RelayOptions {
                style,
                tooltip: "toclip: copied to clipboard".to_string(),
                ..RelayOptions::default()
            },
        )
    }

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("hello world", 40), "hello world");
    }

    #[test]
    fn test_preview_truncates_hundred_chars() {
        let text = "x".repeat(100);
        let result = preview(&text, 40);
        assert_eq!(result, format!("{}...", "x".repeat(40)));
    }

    #[test]
    fn test_preview_sixty_chars_keeps_first_forty() {
        let text: String = ('a'..='z').cycle().take(60).collect();
        let result = preview(&text, 40);
        assert_eq!(result, format!("{}...", &text[..40]));
    }

    #[test]
    fn test_preview_exactly_max_chars_not_truncated() {
        let text = "y".repeat(40);
        assert_eq!(preview(&text, 40), text);
    }

    #[test]
    fn test_preview_collapses_line_breaks_and_tabs() {
        assert_eq!(preview("a\r\nb\n\n\tc\td", 40), "a b c d");
    }

    #[test]
    fn test_preview_bare_carriage_return_and_tab_become_spaces() {
        assert_eq!(preview("a\rb", 40), "a b");
        assert_eq!(preview("col1\tcol2", 40), "col1 col2");
    }

    #[test]
    fn test_preview_collapses_around_ansi() {
        assert_eq!(preview("\x1b[1mone\x1b[0m\ttwo", 40), "one two");
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let text = "日".repeat(50);
        assert_eq!(preview(&text, 20), format!("{}...", "日".repeat(20)));
    }

    #[test]
    fn test_preview_strips_ansi() {
        assert_eq!(preview("\x1b[31mred\x1b[0m", 40), "red");
    }

    #[test]
    fn test_relay_text_trims_before_copy() {
        let mut relay = relay(NotificationStyle::Popup);
        let outcome = relay.relay_text("hello world\n");

        assert_eq!(relay.clipboard().contents(), Some("hello world"));
        assert_eq!(
            outcome,
            RelayOutcome::Copied {
                preview: "hello world".to_string()
            }
        );
        assert_eq!(
            relay.notifier().history(),
            &[Notification::Popup("📋: hello world".to_string())]
        );
        assert!(!relay.hide_timer().is_armed());
        assert_eq!(relay.last_preview(), Some("hello world"));
    }

    #[test]
    fn test_relay_keeps_inner_whitespace() {
        let mut relay = relay(NotificationStyle::Popup);
        relay.relay_text("  line one\n\tline two  \n\n");
        assert_eq!(relay.clipboard().contents(), Some("line one\n\tline two"));
    }

    #[tokio::test]
    async fn test_status_bar_arms_single_timer() {
        let mut relay = relay(NotificationStyle::StatusBar);
        relay.relay_text("first");

        assert!(relay.hide_timer().is_armed());
        assert_eq!(relay.notifier().visible_status(), Some("📋: first"));
        assert_eq!(
            relay.notifier().history()[0],
            Notification::Status {
                text: "📋: first".to_string(),
                tooltip: "toclip: copied to clipboard".to_string()
            }
        );

        relay.hide_status();
        assert!(!relay.hide_timer().is_armed());
        assert_eq!(relay.notifier().visible_status(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_copy_restarts_countdown() {
        let mut relay = relay(NotificationStyle::StatusBar);

        relay.relay_text("first");
        let first_deadline = relay.hide_timer().deadline().unwrap();

        tokio::time::advance(Duration::from_millis(500)).await;
        relay.relay_text("second");
        let second_deadline = relay.hide_timer().deadline().unwrap();

        assert_eq!(second_deadline - first_deadline, Duration::from_millis(500));
        assert_eq!(relay.notifier().visible_status(), Some("📋: second"));

        // The first 3s mark passes without hiding the second copy
        tokio::time::advance(Duration::from_millis(2600)).await;
        let early = tokio::time::timeout(Duration::ZERO, relay.hide_due()).await;
        assert!(early.is_err());

        relay.hide_due().await;
        relay.hide_status();
        assert_eq!(relay.notifier().visible_status(), None);
        assert_eq!(
            relay
                .notifier()
                .history()
                .iter()
                .filter(|n| **n == Notification::Hidden)
                .count(),
            1
        );
    }

    #[test]
    fn test_clipboard_failure_reported_once() {
        let mut relay = ClipboardRelay::new(
            MemoryClipboard::failing(),
            RecordingNotifier::new(),
            RelayOptions::default(),
        );

        let outcome = relay.relay_text("data");
        assert_eq!(outcome, RelayOutcome::ClipboardFailed);
        assert_eq!(relay.notifier().errors(), vec!["failed to write to clipboard"]);
        assert_eq!(relay.notifier().visible_status(), None);
        assert!(!relay.hide_timer().is_armed());
        assert_eq!(relay.last_preview(), None);
    }

    #[tokio::test]
    async fn test_handle_reads_file_and_leaves_it() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("1.tmp"), "hello world\n").unwrap();

        let mut relay = relay(NotificationStyle::Popup);
        let event = WatchEvent::new(dir.path(), "1.tmp");
        relay.handle(&event).await;

        assert_eq!(relay.clipboard().contents(), Some("hello world"));
        assert!(event.path().exists());
    }

    #[tokio::test]
    async fn test_handle_skips_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut relay = relay(NotificationStyle::Popup);

        let outcome = relay.handle(&WatchEvent::new(dir.path(), "gone.tmp")).await;
        assert_eq!(outcome, RelayOutcome::Skipped);
        assert!(relay.clipboard().writes().is_empty());
        assert!(relay.notifier().history().is_empty());
    }

    #[tokio::test]
    async fn test_handle_skips_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bin.tmp"), [0xff, 0xfe, 0x00]).unwrap();
        let mut relay = relay(NotificationStyle::Popup);

        let outcome = relay.handle(&WatchEvent::new(dir.path(), "bin.tmp")).await;
        assert_eq!(outcome, RelayOutcome::Skipped);
        assert!(relay.clipboard().writes().is_empty());
    }

    #[test]
    fn test_reset_hides_pending_status() {
        let mut relay = relay(NotificationStyle::StatusBar);
        relay.relay_text("x");
        relay.reset();
        assert!(!relay.hide_timer().is_armed());
        assert_eq!(relay.notifier().visible_status(), None);

        // Nothing pending: no extra hide
        let before = relay.notifier().history().len();
        relay.reset();
        assert_eq!(relay.notifier().history().len(), before);
    }
}
