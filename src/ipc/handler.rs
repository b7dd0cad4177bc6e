use serde_json::{Value, json};

use super::action::{IpcAction, IpcHandlerResult};
use super::protocol::{IpcRequest, IpcResponse};
use crate::clipboard::Clipboard;
use crate::controller::Controller;
use crate::relay::Notifier;

const COMMANDS: &[(&str, &str)] = &[
    ("ping", "Check that the daemon is alive"),
    ("status", "Report enabled/active state, instance, directory and aliases"),
    ("toggle", "Flip and persist the enabled setting"),
    ("turn_on", "Start a fresh session without changing the config"),
    ("turn_off", "Stop the current session without changing the config"),
    ("change_alias", "Rename aliases; args: {\"copy\": NAME, \"tee\": NAME}"),
    ("hook", "Shell line that installs the aliases in the current shell"),
    ("shutdown", "Turn off and exit the daemon"),
    ("help", "List commands"),
];

/// Applies control commands to a [`Controller`]
pub struct IpcCommandHandler {
    version: String,
}

impl IpcCommandHandler {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn handle<C: Clipboard, N: Notifier>(
        &self,
        request: &IpcRequest,
        controller: &mut Controller<C, N>,
    ) -> IpcHandlerResult {
        log::debug!("Control command: {}", request.command);

        let response = match request.command.as_str() {
            "ping" => IpcResponse::ok(json!({"pong": true})),
            "status" => self.handle_status(controller),
            "toggle" => match controller.toggle() {
                Ok(enabled) => IpcResponse::ok(json!({"enabled": enabled, "active": controller.is_on()})),
                Err(e) => IpcResponse::err(format!("{:#}", anyhow::Error::from(e))),
            },
            "turn_on" => match controller.turn_on() {
                Ok(()) => self.handle_status(controller),
                Err(e) => IpcResponse::err(format!("{:#}", anyhow::Error::from(e))),
            },
            "turn_off" => {
                controller.turn_off();
                self.handle_status(controller)
            }
            "change_alias" => self.handle_change_alias(request, controller),
            "hook" => match controller.session() {
                Some(session) => IpcResponse::ok(json!(session.hook())),
                None => IpcResponse::err("termclip is not active"),
            },
            "shutdown" => {
                return IpcHandlerResult::with_actions(IpcResponse::ok_empty(), vec![IpcAction::Shutdown]);
            }
            "help" => self.handle_help(),
            _ => IpcResponse::err(format!("unknown command: {}", request.command)),
        };

        if let Some(error) = &response.error {
            log::warn!("Control command {} failed: {}", request.command, error);
        }
        IpcHandlerResult::response_only(response)
    }

    fn handle_status<C: Clipboard, N: Notifier>(&self, controller: &Controller<C, N>) -> IpcResponse {
        match serde_json::to_value(controller.status()) {
            Ok(Value::Object(mut status)) => {
                status.insert("version".to_string(), json!(self.version));
                IpcResponse::ok(Value::Object(status))
            }
            Ok(other) => IpcResponse::ok(other),
            Err(e) => IpcResponse::err(format!("failed to encode status: {}", e)),
        }
    }

    fn handle_change_alias<C: Clipboard, N: Notifier>(
        &self,
        request: &IpcRequest,
        controller: &mut Controller<C, N>,
    ) -> IpcResponse {
        let copy = request.str_arg("copy").map(str::to_string);
        let tee = request.str_arg("tee").map(str::to_string);

        if copy.is_none() && tee.is_none() {
            return IpcResponse::err(format!(
                "change_alias needs a \"copy\" or \"tee\" name, got {}",
                request.args
            ));
        }

        match controller.change_alias(copy, tee) {
            Ok(aliases) => IpcResponse::ok(json!({"copy": aliases.copy, "tee": aliases.tee})),
            Err(e) => IpcResponse::err(format!("{:#}", anyhow::Error::from(e))),
        }
    }

    fn handle_help(&self) -> IpcResponse {
        let commands: Vec<Value> = COMMANDS
            .iter()
            .map(|(name, description)| json!({"name": name, "description": description}))
            .collect();
        IpcResponse::ok(json!({ "commands": commands }))
    }
}
