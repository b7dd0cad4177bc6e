//! The daemon loop: watch events, hide deadlines, control commands and
//! shutdown, multiplexed on one task.

use std::future::Future;
use std::time::Duration;

use tokio::process::Child;

use crate::clipboard::Clipboard;
use crate::controller::Controller;
use crate::ipc::{IpcCommandHandler, IpcConnection, IpcResponse, IpcServer};
use crate::relay::Notifier;

/// How long a control connection may hold the loop before sending its request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

pub struct Daemon<C: Clipboard, N: Notifier> {
    controller: Controller<C, N>,
    server: IpcServer,
    handler: IpcCommandHandler,
}

impl<C: Clipboard, N: Notifier> Daemon<C, N> {
    pub fn new(controller: Controller<C, N>, server: IpcServer) -> Self {
        Self {
            controller,
            server,
            handler: IpcCommandHandler::new(env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn controller(&self) -> &Controller<C, N> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller<C, N> {
        &mut self.controller
    }

    /// Serve until `shutdown` resolves or a client sends `shutdown`.
    /// The controller is always turned off before returning.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        log::info!("Listening on {:?}", self.server.socket_path());

        loop {
            tokio::select! {
                wake = self.controller.wait() => {
                    self.controller.process(wake).await;
                }
                conn = self.server.accept() => match conn {
                    Ok(conn) => {
                        if self.serve(conn).await {
                            log::info!("Shutdown requested over control socket");
                            break;
                        }
                    }
                    Err(e) => log::warn!("Failed to accept control connection: {}", e),
                },
                _ = &mut shutdown => {
                    log::info!("Shutting down");
                    break;
                }
            }
        }

        self.controller.turn_off();
    }

    /// Answer the single request on `conn`. Returns whether shutdown was requested.
    async fn serve(&mut self, mut conn: IpcConnection) -> bool {
        let request = match tokio::time::timeout(REQUEST_TIMEOUT, conn.read_request()).await {
            Ok(Ok(Some(request))) => request,
            Ok(Ok(None)) => return false,
            Ok(Err(e)) => {
                log::warn!("Bad control request: {}", e);
                let _ = conn.send_response(&IpcResponse::err(e.to_string())).await;
                return false;
            }
            Err(_) => {
                log::debug!("Control client sent nothing, closing");
                return false;
            }
        };

        let result = self.handler.handle(&request, &mut self.controller);
        if let Err(e) = conn.send_response(&result.response).await {
            log::debug!("Control client went away: {}", e);
        }
        result.requests_shutdown()
    }
}

/// Resolves on Ctrl-C, SIGTERM, or when `child` exits
pub async fn shutdown_signal(child: Option<Child>) {
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    let child_exit = async {
        match child {
            Some(mut child) => match child.wait().await {
                Ok(status) => log::info!("Child exited with {}", status),
                Err(e) => log::warn!("Failed waiting for child: {}", e),
            },
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => log::info!("Interrupted"),
        _ = terminate => log::info!("Terminated"),
        _ = child_exit => {}
    }
}
