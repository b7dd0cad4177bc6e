use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::{self, Config};
use crate::ipc::{IpcClient, IpcRequest};
use crate::session::current_uid;

/// Environment variable overriding the control socket path
pub const SOCKET_ENV: &str = "TERMCLIP_SOCKET";

/// termclip - pipe shell output into the clipboard
#[derive(Parser, Debug)]
#[command(name = "termclip")]
#[command(version)]
#[command(about = "Pipe shell output into the host clipboard")]
#[command(long_about = "termclip runs a small daemon that watches a private drop directory and
copies anything dropped there into the clipboard.

Shells load two aliases from the daemon: `toclip` copies stdin, `teeclip`
copies stdin and passes it through.

Quick start:
  1. Run 'termclip init' to write a config file
  2. Run 'termclip run -- $SHELL' to start the daemon with a shell under it
  3. In that shell: eval \"$TERMCLIP_HOOK\"   (or eval \"$(termclip hook)\" anywhere)
  4. echo hello | toclip")]
pub struct Cli {
    /// Path to config file (defaults to ~/.config/termclip/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Control socket path (overrides config and TERMCLIP_SOCKET)
    #[arg(long, global = true)]
    pub socket: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Append log records to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Control command; starts the daemon when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands. Everything except `run` and `init` talks to a running daemon.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the daemon, optionally running COMMAND under it
    Run {
        /// Command to spawn with the session variables exported; the daemon
        /// exits when it does
        #[arg(last = true)]
        command: Vec<String>,
    },
    /// Flip the enabled setting and persist it
    Toggle,
    /// Start a fresh session (does not change the config)
    On,
    /// Stop the current session (does not change the config)
    Off,
    /// Rename the copy alias and/or the tee alias
    ChangeAlias {
        /// New copy alias; prompted for on a terminal when omitted
        name: Option<String>,
        /// New tee alias
        #[arg(long)]
        tee: Option<String>,
    },
    /// Show daemon state
    Status,
    /// Print the shell line that installs the aliases
    Hook,
    /// Check that the daemon is running
    Ping,
    /// Turn off and stop the daemon
    Stop,
    /// List control commands understood by the daemon
    #[command(name = "commands")]
    IpcHelp,
    /// Write a default config file
    Init,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config::default_config_path)
    }
}

/// `<tmp>/termclip-<uid>.sock`
pub fn default_socket_path() -> PathBuf {
    std::env::temp_dir().join(format!("termclip-{}.sock", current_uid()))
}

/// Precedence: `--socket`, then `TERMCLIP_SOCKET`, then the config, then the default
pub fn resolve_socket_path(flag: Option<&Path>, env_value: Option<&str>, config: &Config) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from))
        .or_else(|| config.socket_path.clone())
        .unwrap_or_else(default_socket_path)
}

/// Write a default config to `path` unless one is already there
pub fn init_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        println!("Config file {:?} already exists.", path);
        return Ok(());
    }

    Config::default()
        .save_to_file(path)
        .with_context(|| format!("Failed to write {:?}", path))?;

    println!("Created {:?}", path);
    println!("\nNext steps:");
    println!("  1. Start the daemon: termclip run -- $SHELL");
    println!("  2. Add to your shell rc: [ -n \"$TERMCLIP_HOOK\" ] && eval \"$TERMCLIP_HOOK\"");
    Ok(())
}

/// Ask for a new copy alias on an interactive terminal.
/// Returns `None` when stdin is not a TTY or the answer is empty.
pub fn prompt_alias(current: &str) -> anyhow::Result<Option<String>> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    print!("New copy alias [{}]: ", current);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let name = input.trim();
    Ok((!name.is_empty()).then(|| name.to_string()))
}

/// Control request for a daemon subcommand
pub fn build_request(command: &Commands) -> anyhow::Result<IpcRequest> {
    let request = match command {
        Commands::Ping => IpcRequest::new("ping"),
        Commands::Status => IpcRequest::new("status"),
        Commands::Toggle => IpcRequest::new("toggle"),
        Commands::On => IpcRequest::new("turn_on"),
        Commands::Off => IpcRequest::new("turn_off"),
        Commands::Hook => IpcRequest::new("hook"),
        Commands::Stop => IpcRequest::new("shutdown"),
        Commands::IpcHelp => IpcRequest::new("help"),
        Commands::ChangeAlias { name, tee } => {
            if name.is_none() && tee.is_none() {
                bail!("change-alias needs a new copy alias and/or --tee NAME");
            }
            let mut args = serde_json::json!({});
            if let Some(name) = name {
                args["copy"] = serde_json::json!(name);
            }
            if let Some(tee) = tee {
                args["tee"] = serde_json::json!(tee);
            }
            IpcRequest::with_args("change_alias", args)
        }
        Commands::Run { .. } | Commands::Init => {
            return Err(anyhow!("{:?} does not talk to the daemon", command));
        }
    };
    Ok(request)
}

/// Send `command` to the daemon and print the reply.
///
/// `hook` prints the bare shell line so it can be passed to `eval`; every
/// other command prints the JSON response. Exits with status 1 when the
/// daemon reports a failure.
pub async fn run_ipc_command(command: &Commands, socket_path: &Path) -> anyhow::Result<()> {
    let request = build_request(command)?;

    let mut client = IpcClient::connect(socket_path).await.with_context(|| {
        format!(
            "Could not connect to termclip at {:?}. Is 'termclip run' running?",
            socket_path
        )
    })?;

    let response = client
        .call(&request)
        .await
        .with_context(|| format!("Failed to communicate with termclip at {:?}", socket_path))?;

    match (command, &response.result) {
        (Commands::Hook, Some(serde_json::Value::String(hook))) if response.success => {
            println!("{}", hook);
        }
        _ => {
            let json = serde_json::to_string_pretty(&response)
                .with_context(|| "Failed to serialize response")?;
            println!("{}", json);
        }
    }

    if !response.success {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
