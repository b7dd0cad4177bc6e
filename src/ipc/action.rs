use super::protocol::IpcResponse;

/// Side effects a command asks the daemon loop to perform after replying
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpcAction {
    Shutdown,
}

/// Response to send plus actions to apply
#[derive(Debug)]
pub struct IpcHandlerResult {
    pub response: IpcResponse,
    pub actions: Vec<IpcAction>,
}

impl IpcHandlerResult {
    pub fn response_only(response: IpcResponse) -> Self {
        Self {
            response,
            actions: Vec::new(),
        }
    }

    pub fn with_actions(response: IpcResponse, actions: Vec<IpcAction>) -> Self {
        Self { response, actions }
    }

    pub fn requests_shutdown(&self) -> bool {
        self.actions.contains(&IpcAction::Shutdown)
    }
}
