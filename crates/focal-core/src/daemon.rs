use anyhow::Result;
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
    time::Duration,
};
use tokio::sync::{broadcast, Mutex};
use tokio::time::interval;

use crate::{
    clock::{Clock, SystemClock},
    config::{default_list_path, get_data_dir, EngineConfig, UnproductiveList},
    controller::{SessionController, SessionMode, TickInput},
    events::EngineEvent,
    ipc::{listen, DaemonIpcHandler, CONTROL_SOCKET_NAME},
    monitor::{create_window_sampler, face::create_face_sampler, FaceSampler, WindowSampler},
};

/// Runs the engine: owns the controller, polls the samplers, and performs
/// exactly one `tick()` per interval against the freshest sampled values.
pub struct Daemon {
    controller: Arc<Mutex<SessionController>>,
    unproductive: Arc<RwLock<UnproductiveList>>,
    list_path: PathBuf,
    window_sampler: Box<dyn WindowSampler>,
    face_sampler: Box<dyn FaceSampler>,
    clock: Arc<dyn Clock>,
    shutdown_signal: Arc<AtomicBool>,
    tick_secs: u64,
    mode: SessionMode,
}

impl Daemon {
    /// Assemble the daemon: load the persisted unproductive list, create the
    /// platform window sampler, and bind the face feed.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory is unavailable, the list file
    /// is unreadable, or sampler initialization fails.
    pub async fn new(mode: SessionMode, config: EngineConfig) -> Result<Self> {
        let list_path = default_list_path()?;
        let unproductive = Arc::new(RwLock::new(UnproductiveList::load(&list_path)?));
        let controller = Arc::new(Mutex::new(SessionController::new(
            config.clone(),
            unproductive.clone(),
        )));
        let face_sampler = create_face_sampler(&get_data_dir()?).await?;

        Ok(Self {
            controller,
            unproductive,
            list_path,
            window_sampler: create_window_sampler()?,
            face_sampler,
            clock: Arc::new(SystemClock),
            shutdown_signal: Arc::new(AtomicBool::new(false)),
            tick_secs: u64::from(config.tick_secs),
            mode,
        })
    }

    /// Start the session and drive the tick loop until Ctrl-C or an IPC
    /// shutdown request arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the IPC socket cannot be prepared or the session
    /// fails to start.
    pub async fn run_with_signals(&mut self) -> Result<()> {
        let sock_path = get_data_dir()?.join(CONTROL_SOCKET_NAME);
        let ipc_handler = Arc::new(DaemonIpcHandler::new(
            self.controller.clone(),
            self.unproductive.clone(),
            self.list_path.clone(),
            Arc::clone(&self.clock),
            self.shutdown_signal.clone(),
        ));

        tokio::spawn(async move {
            if let Err(e) = listen(ipc_handler, &sock_path).await {
                log::error!("IPC listener failed: {e}");
            }
        });

        {
            let mut controller = self.controller.lock().await;
            controller.start(self.mode, self.clock.now())?;
            let events = controller.subscribe();
            tokio::spawn(announce_events(events));
        }

        let mut ticker = interval(Duration::from_secs(self.tick_secs));
        log::info!("daemon started ({} mode)", self.mode.description());

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = tokio::signal::ctrl_c() => {
                    log::info!("received Ctrl-C, shutting down...");
                    self.shutdown_signal.store(true, Ordering::SeqCst);
                }
            }

            if self.shutdown_signal.load(Ordering::SeqCst) {
                break;
            }
        }

        self.controller.lock().await.stop();
        log::info!("daemon shut down gracefully");
        Ok(())
    }

    /// One scheduling tick. Sampler failures degrade into a fail-open tick;
    /// they never stop the loop.
    async fn tick(&mut self) {
        let app_token = match self.window_sampler.current_app_token().await {
            Ok(token) => token,
            Err(e) => {
                log::warn!("window sampler failed, recording blank tick: {e}");
                None
            }
        };
        let face_present = match self.face_sampler.face_present().await {
            Ok(value) => value,
            Err(e) => {
                log::warn!("face sampler failed: {e}");
                None
            }
        };

        let now = self.clock.now();
        let mut controller = self.controller.lock().await;
        if let Some(outcome) = controller.tick(
            TickInput {
                app_token,
                face_present,
            },
            now,
        ) {
            log::debug!(
                "tick: app={:?} distracted={} face={}",
                outcome.sample.app_token,
                outcome.sample.distracted,
                outcome.sample.face_present
            );
        }
    }
}

/// Presentation side of the engine events: the daemon's log is the cue
/// channel (a UI would subscribe the same way).
async fn announce_events(mut events: broadcast::Receiver<EngineEvent>) {
    loop {
        match events.recv().await {
            Ok(EngineEvent::PhaseChanged { from, to }) => {
                log::info!(
                    "phase changed: {} -> {}",
                    from.description(),
                    to.description()
                );
            }
            Ok(EngineEvent::DistractionWarning { source }) => {
                log::info!("distraction warning: {source:?}");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::warn!("event stream lagged, skipped {skipped} events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
