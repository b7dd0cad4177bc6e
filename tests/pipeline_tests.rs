mod common;

use std::time::Duration;

use common::{next_outcome, run_in_shell, test_controller, test_controller_with};
use tempfile::TempDir;
use termclip::clipboard::MemoryClipboard;
use termclip::config::Config;
use termclip::controller::{Controller, Wake};
use termclip::env_guard::MemoryEnv;
use termclip::relay::{NotificationStyle, RecordingNotifier, RelayOutcome};

const EVENT_WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_copy_alias_reaches_clipboard_trimmed() {
    let root = TempDir::new().unwrap();
    let mut controller = test_controller(&root);
    controller.turn_on().unwrap();
    let hook = controller.session().unwrap().hook().to_string();

    run_in_shell(&hook, "printf 'hello world\\n' | toclip");

    let outcome = next_outcome(&mut controller, EVENT_WAIT).await;
    assert_eq!(
        outcome,
        Some(RelayOutcome::Copied {
            preview: "hello world".to_string()
        })
    );
    assert_eq!(controller.relay().clipboard().contents(), Some("hello world"));
    assert_eq!(controller.relay().notifier().visible_status(), Some("📋: hello world"));
}

#[tokio::test]
async fn test_tee_alias_passes_input_through() {
    let root = TempDir::new().unwrap();
    let mut controller = test_controller(&root);
    controller.turn_on().unwrap();
    let hook = controller.session().unwrap().hook().to_string();

    let stdout = run_in_shell(&hook, "printf '  line one\\nline two\\n\\n' | teeclip");

    assert_eq!(stdout, "  line one\nline two\n\n");
    next_outcome(&mut controller, EVENT_WAIT).await.unwrap();
    assert_eq!(
        controller.relay().clipboard().contents(),
        Some("line one\nline two")
    );
}

#[tokio::test]
async fn test_long_output_preview_truncated() {
    let root = TempDir::new().unwrap();
    let mut controller = test_controller_with(&root, NotificationStyle::Popup);
    controller.turn_on().unwrap();
    let hook = controller.session().unwrap().hook().to_string();

    run_in_shell(&hook, "printf '%0100d' 0 | toclip");

    let outcome = next_outcome(&mut controller, EVENT_WAIT).await;
    let expected = format!("{}...", "0".repeat(40));
    assert_eq!(outcome, Some(RelayOutcome::Copied { preview: expected }));
    assert_eq!(controller.relay().clipboard().contents().map(str::len), Some(100));
}

#[tokio::test]
async fn test_sequential_copies_each_relayed_once() {
    let root = TempDir::new().unwrap();
    let mut controller = test_controller_with(&root, NotificationStyle::Popup);
    controller.turn_on().unwrap();
    let hook = controller.session().unwrap().hook().to_string();

    run_in_shell(&hook, "printf one | toclip; printf two | toclip");

    next_outcome(&mut controller, EVENT_WAIT).await.unwrap();
    next_outcome(&mut controller, EVENT_WAIT).await.unwrap();
    let extra = next_outcome(&mut controller, Duration::from_millis(300)).await;

    assert_eq!(extra, None);
    let mut writes = controller.relay().clipboard().writes().to_vec();
    writes.sort();
    assert_eq!(writes, vec!["one", "two"]);
}

#[tokio::test]
async fn test_second_instance_never_fires_first() {
    let root = TempDir::new().unwrap();
    let mut first = test_controller(&root);
    let mut second = test_controller(&root);
    first.turn_on().unwrap();
    second.turn_on().unwrap();
    assert_eq!(first.root(), second.root());

    let hook = second.session().unwrap().hook().to_string();
    run_in_shell(&hook, "printf 'for second' | toclip");

    assert!(next_outcome(&mut second, EVENT_WAIT).await.is_some());
    assert_eq!(next_outcome(&mut first, Duration::from_millis(500)).await, None);

    assert!(first.relay().clipboard().writes().is_empty());
    assert_eq!(second.relay().clipboard().contents(), Some("for second"));
}

#[tokio::test]
async fn test_status_hidden_after_delay() {
    let root = TempDir::new().unwrap();
    let config = Config {
        temp_directory: Some(root.path().join("scratch")),
        hide_delay_ms: 100,
        ..Config::default()
    };
    let mut controller = Controller::new(
        config,
        MemoryClipboard::new(),
        RecordingNotifier::new(),
        Box::new(MemoryEnv::new()),
    );
    controller.turn_on().unwrap();
    let hook = controller.session().unwrap().hook().to_string();

    run_in_shell(&hook, "printf copied | toclip");
    next_outcome(&mut controller, EVENT_WAIT).await.unwrap();
    assert!(controller.relay().hide_timer().is_armed());

    let wake = tokio::time::timeout(EVENT_WAIT, controller.wait()).await.unwrap();
    assert_eq!(wake, Wake::HideStatus);
    controller.process(wake).await;

    assert_eq!(controller.relay().notifier().visible_status(), None);
    assert!(!controller.relay().hide_timer().is_armed());
}
