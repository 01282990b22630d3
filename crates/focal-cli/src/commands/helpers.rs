use anyhow::Result;
use focal_core::config::get_data_dir;
use focal_core::ipc::{IpcClient, IpcRequest, CONTROL_SOCKET_NAME};

/// Client for the daemon control socket.
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn client() -> Result<IpcClient> {
    Ok(IpcClient::new(&get_data_dir()?.join(CONTROL_SOCKET_NAME)))
}

/// True when a daemon answers on the control socket.
pub async fn daemon_running() -> bool {
    match client() {
        Ok(client) => client.send_command(IpcRequest::Status).await.is_ok(),
        Err(_) => false,
    }
}
