//! Control socket between the `termclip` subcommands and the running daemon.

pub mod action;
pub mod client;
pub mod handler;
pub mod protocol;
pub mod server;

pub use action::{IpcAction, IpcHandlerResult};
pub use client::{IpcClient, is_daemon_running};
pub use handler::IpcCommandHandler;
pub use protocol::{IpcRequest, IpcResponse};
pub use server::{IpcConnection, IpcServer};
