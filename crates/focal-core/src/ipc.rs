use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{UnixListener, UnixStream},
    sync::Mutex,
};

use crate::analytics::Report;
use crate::clock::Clock;
use crate::config::UnproductiveList;
use crate::controller::{SessionController, StatusSnapshot};

/// Name of the daemon control socket, created under the data directory.
pub const CONTROL_SOCKET_NAME: &str = "focal.sock";

/// IPC request from CLI to daemon
#[derive(Serialize, Deserialize, Debug)]
pub enum IpcRequest {
    Status,
    Report,
    AddApp(String),
    RemoveApp(String),
    ListApps,
    Shutdown,
}

/// IPC response from daemon to CLI
#[derive(Serialize, Deserialize, Debug)]
pub enum IpcResponse {
    Status(StatusSnapshot),
    /// `None` when no sample has been recorded yet.
    Report(Option<Report>),
    Apps(Vec<String>),
    Updated { changed: bool },
    Shutdown,
}

#[derive(Debug)]
pub struct IpcClient {
    sock_path: PathBuf,
}

impl IpcClient {
    #[must_use]
    pub fn new(sock_path: &Path) -> Self {
        Self {
            sock_path: sock_path.to_path_buf(),
        }
    }

    /// Send one request and wait for the daemon's response.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is not reachable or the wire encoding
    /// fails.
    pub async fn send_command(&self, request: IpcRequest) -> Result<IpcResponse> {
        let mut stream = UnixStream::connect(&self.sock_path).await?;

        let encoded = bincode::serialize(&request)?;
        stream.write_all(&encoded).await?;
        stream.shutdown().await?;

        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer).await?;
        let response: IpcResponse = bincode::deserialize(&buffer)?;

        Ok(response)
    }
}

pub struct DaemonIpcHandler {
    controller: Arc<Mutex<SessionController>>,
    unproductive: Arc<RwLock<UnproductiveList>>,
    list_path: PathBuf,
    clock: Arc<dyn Clock>,
    shutdown_signal: Arc<AtomicBool>,
}

impl DaemonIpcHandler {
    #[must_use]
    pub fn new(
        controller: Arc<Mutex<SessionController>>,
        unproductive: Arc<RwLock<UnproductiveList>>,
        list_path: PathBuf,
        clock: Arc<dyn Clock>,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            controller,
            unproductive,
            list_path,
            clock,
            shutdown_signal,
        }
    }

    /// Handle one decoded request and write the response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing the response fails.
    pub async fn handle(&self, stream: &mut UnixStream, request: IpcRequest) -> Result<()> {
        let response = match request {
            IpcRequest::Status => {
                let controller = self.controller.lock().await;
                IpcResponse::Status(controller.status(self.clock.now()))
            }
            IpcRequest::Report => {
                let controller = self.controller.lock().await;
                IpcResponse::Report(controller.summarize(self.clock.now()).ok())
            }
            IpcRequest::AddApp(name) => {
                let changed = self.unproductive.write().unwrap().add(&name);
                if changed {
                    self.persist_list();
                }
                IpcResponse::Updated { changed }
            }
            IpcRequest::RemoveApp(name) => {
                let changed = self.unproductive.write().unwrap().remove(&name);
                if changed {
                    self.persist_list();
                }
                IpcResponse::Updated { changed }
            }
            IpcRequest::ListApps => IpcResponse::Apps(self.unproductive.read().unwrap().apps()),
            IpcRequest::Shutdown => {
                self.shutdown_signal.store(true, Ordering::SeqCst);
                IpcResponse::Shutdown
            }
        };

        let encoded = bincode::serialize(&response)?;
        stream.write_all(&encoded).await?;
        Ok(())
    }

    fn persist_list(&self) {
        let list = self.unproductive.read().unwrap().clone();
        if let Err(e) = list.save(&self.list_path) {
            log::warn!("failed to persist unproductive list: {e}");
        }
    }
}

pub async fn listen(handler: Arc<DaemonIpcHandler>, sock_path: &Path) -> io::Result<()> {
    if sock_path.exists() {
        fs::remove_file(sock_path)?;
    }
    let listener = UnixListener::bind(sock_path)?;

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let handler = handler.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0; 1024];
                    match stream.read(&mut buf).await {
                        Ok(n) if n > 0 => match bincode::deserialize::<IpcRequest>(&buf[..n]) {
                            Ok(request) => {
                                if let Err(e) = handler.handle(&mut stream, request).await {
                                    log::error!("IPC handle error: {e}");
                                }
                            }
                            Err(e) => {
                                log::error!("IPC deserialize error: {e}");
                            }
                        },
                        Ok(_) => {} // Connection closed
                        Err(e) => {
                            log::error!("IPC read error: {e}");
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("IPC accept error: {e}");
            }
        }
    }
}
