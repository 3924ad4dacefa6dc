pub mod handler;
pub mod monitor;

use crate::alert::AlertRouter;
use crate::config::HostsentryConfig;
use crate::detector::AnomalyDetector;
use crate::error::Result;
use crate::filter::PathFilter;
use crate::output::{FileLogSink, LogSink};
use handler::EventRouter;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A monitoring session owning its lifecycle state and worker handles.
///
/// `start` and `stop` are both idempotent. Shutdown is symmetric: the
/// filesystem worker and both pollers all receive the cancellation signal
/// and are awaited before `stop` returns, so no best-effort background
/// worker outlives the session.
pub struct MonitorSession {
    config: HostsentryConfig,
    alert_router: Arc<AlertRouter>,
    detector: Arc<AnomalyDetector>,
    state: SessionState,
}

enum SessionState {
    Idle,
    Running {
        shutdown: watch::Sender<bool>,
        workers: Vec<JoinHandle<()>>,
    },
}

impl std::fmt::Debug for MonitorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            SessionState::Idle => "idle",
            SessionState::Running { .. } => "running",
        };
        f.debug_struct("MonitorSession")
            .field("state", &state)
            .field("watch_paths", &self.config.watch_paths)
            .field("threshold", &self.detector.threshold())
            .finish_non_exhaustive()
    }
}

impl MonitorSession {
    /// Validate the configuration and assemble the pipeline. No worker is
    /// spawned until `start`.
    pub fn new(config: HostsentryConfig, alert_router: Arc<AlertRouter>) -> Result<Self> {
        config.validate()?;

        let detector = Arc::new(AnomalyDetector::new(
            config.detector.threshold as usize,
            config.window(),
            config.detector.fire_policy,
        )?);

        Ok(Self {
            config,
            alert_router,
            detector,
            state: SessionState::Idle,
        })
    }

    /// The detector shared by every producer in this session.
    pub fn detector(&self) -> Arc<AnomalyDetector> {
        Arc::clone(&self.detector)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Running { .. })
    }

    /// Start monitoring. A no-op when already running. A failing watch
    /// source (inaccessible root, OS watch limit) is fatal to this session
    /// and returned here; the process keeps going.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            log::debug!("Monitoring already running");
            return Ok(());
        }

        let filter = PathFilter::new(&self.config.ignore_patterns)?;
        let log_sink: Arc<dyn LogSink> = Arc::new(FileLogSink::new(&self.config.log_file));
        let router = Arc::new(EventRouter::new(
            filter,
            Arc::clone(&self.alert_router),
            log_sink,
            Arc::clone(&self.detector),
        ));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut workers = Vec::new();

        workers.push(monitor::spawn_fs_worker(
            &self.config.watch_paths,
            router,
            shutdown_rx.clone(),
        )?);

        if self.config.poller.enabled {
            workers.push(crate::poller::network::spawn(
                self.config.poll_interval(),
                Arc::clone(&self.detector),
                Arc::clone(&self.alert_router),
                shutdown_rx.clone(),
            ));
            workers.push(crate::poller::process::spawn(
                self.config.poll_interval(),
                Arc::clone(&self.detector),
                Arc::clone(&self.alert_router),
                shutdown_rx,
            ));
        }

        self.state = SessionState::Running {
            shutdown: shutdown_tx,
            workers,
        };
        log::info!("Monitoring started");
        Ok(())
    }

    /// Stop monitoring and wait for every worker to quiesce. A no-op when
    /// not running.
    pub async fn stop(&mut self) {
        let state = std::mem::replace(&mut self.state, SessionState::Idle);
        match state {
            SessionState::Idle => {
                log::debug!("Monitoring not running");
            }
            SessionState::Running { shutdown, workers } => {
                let _ = shutdown.send(true);
                for worker in workers {
                    if let Err(e) = worker.await {
                        log::warn!("Worker exited abnormally: {}", e);
                    }
                }
                log::info!("Monitoring stopped");
            }
        }
    }
}
