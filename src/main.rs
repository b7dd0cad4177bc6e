use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;

use termclip::cli::{self, Cli, Commands, SOCKET_ENV, init_config, prompt_alias, run_ipc_command};
use termclip::clipboard::HostClipboard;
use termclip::config::Config;
use termclip::controller::Controller;
use termclip::daemon::{Daemon, shutdown_signal};
use termclip::env_guard::ProcessEnv;
use termclip::ipc::{IpcServer, is_daemon_running};
use termclip::logging;
use termclip::relay::TerminalNotifier;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_file.as_deref())?;

    let config_path = cli.config_path();

    if cli.command == Some(Commands::Init) {
        return init_config(&config_path);
    }

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    let socket_env = std::env::var(SOCKET_ENV).ok();
    let socket_path = cli::resolve_socket_path(cli.socket.as_deref(), socket_env.as_deref(), &config);

    match cli.command {
        None => run_daemon(config, &socket_path, &[]).await,
        Some(Commands::Run { ref command }) => run_daemon(config, &socket_path, command).await,
        Some(Commands::ChangeAlias { name: None, tee: None }) => {
            let Some(name) = prompt_alias(&config.copy_alias)? else {
                bail!("No alias given. Usage: termclip change-alias NAME [--tee NAME]");
            };
            run_ipc_command(&Commands::ChangeAlias { name: Some(name), tee: None }, &socket_path).await
        }
        Some(ref command) => run_ipc_command(command, &socket_path).await,
    }
}

async fn run_daemon(config: Config, socket_path: &std::path::Path, command: &[String]) -> anyhow::Result<()> {
    if is_daemon_running(socket_path, Duration::from_millis(500)).await {
        bail!("termclip is already running at {:?}", socket_path);
    }
    if socket_path.exists() {
        bail!("A daemon at {:?} is not answering; stop it or remove the socket", socket_path);
    }

    let server = IpcServer::new(socket_path)
        .with_context(|| format!("Failed to bind control socket {:?}", socket_path))?;

    let clipboard = HostClipboard::new(config.clipboard_backend);
    let mut controller = Controller::new(
        config,
        clipboard,
        TerminalNotifier::stderr(),
        Box::new(ProcessEnv),
    );

    // Setup failures leave the daemon running but OFF, so `termclip on` can retry
    if let Err(e) = controller.turn_on_if_enabled() {
        log::error!("Failed to turn on at startup: {}", e);
    }

    let child = match command.split_first() {
        Some((program, args)) => Some(
            tokio::process::Command::new(program)
                .args(args)
                .spawn()
                .with_context(|| format!("Failed to start {:?}", program))?,
        ),
        None => None,
    };

    let mut daemon = Daemon::new(controller, server);
    daemon.run(shutdown_signal(child)).await;
    Ok(())
}
