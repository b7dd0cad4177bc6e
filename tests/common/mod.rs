#![allow(dead_code)]

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use tempfile::TempDir;
use termclip::clipboard::MemoryClipboard;
use termclip::config::Config;
use termclip::controller::{Controller, Wake};
use termclip::env_guard::MemoryEnv;
use termclip::relay::{NotificationStyle, RecordingNotifier, RelayOutcome};

pub type TestController = Controller<MemoryClipboard, RecordingNotifier>;

/// Controller rooted in `root`, persisting its config to `root/config.toml`
pub fn test_controller(root: &TempDir) -> TestController {
    test_controller_with(root, NotificationStyle::StatusBar)
}

pub fn test_controller_with(root: &TempDir, style: NotificationStyle) -> TestController {
    let config = Config {
        temp_directory: Some(root.path().join("scratch")),
        config_path: Some(root.path().join("config.toml")),
        notification: style,
        ..Config::default()
    };
    Controller::new(
        config,
        MemoryClipboard::new(),
        RecordingNotifier::new(),
        Box::new(MemoryEnv::new()),
    )
}

/// Run `script` in `sh` after sourcing the session's hook line.
/// Returns the shell's stdout.
pub fn run_in_shell(hook: &str, script: &str) -> String {
    let output = Command::new("sh")
        .arg("-c")
        .arg(format!("{}\n{}", hook, script))
        .output()
        .expect("sh should run");
    assert!(
        output.status.success(),
        "shell failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

/// Write `content` as `<name>.part` then rename, the way the bridge does
pub fn drop_file(dir: &Path, name: &str, content: &str) {
    let part = dir.join(format!("{}.part", name));
    std::fs::write(&part, content).unwrap();
    std::fs::rename(&part, dir.join(name)).unwrap();
}

/// Drive the controller until it relays one event or `wait` elapses
pub async fn next_outcome(controller: &mut TestController, wait: Duration) -> Option<RelayOutcome> {
    let deadline = tokio::time::Instant::now() + wait;
    loop {
        let wake = tokio::time::timeout_at(deadline, controller.wait()).await.ok()?;
        let is_event = matches!(wake, Wake::Event(_));
        if let Some(outcome) = controller.process(wake).await {
            return Some(outcome);
        }
        if is_event && !controller.is_on() {
            return None;
        }
    }
}
