//! termclip: a per-session drop directory that shell aliases write into and
//! a daemon that relays every new drop file to the clipboard.

#[cfg(not(unix))]
compile_error!("termclip only supports unix targets");

pub mod bridge;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod daemon;
pub mod env_guard;
pub mod error;
pub mod ipc;
pub mod logging;
pub mod relay;
pub mod session;
pub mod watch;
