//! Orchestrator - runs the vision and listen loops side by side
//!
//! Each loop runs on its own blocking task. They never wait on each other;
//! the control state is their only link. The orchestrator owns the shutdown
//! fan-out (Ctrl-C, or a loop exiting for any reason) and joins both loops.

use std::sync::Arc;

use crate::control::SharedControlState;
use crate::listen::{ListenLoop, ListenOutcome};
use crate::vision::{SessionOutcome, VisionLoop};
use crate::{Error, Result};

/// Summary of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// How the listen loop ended
    pub listen: ListenOutcome,
    /// Camera sessions opened
    pub sessions_started: u64,
    /// Frames processed across all sessions
    pub frames_processed: u64,
}

/// Requests shutdown when dropped, including during a panic unwind
struct ShutdownOnExit(Arc<SharedControlState>);

impl Drop for ShutdownOnExit {
    fn drop(&mut self) {
        if !self.0.is_shutting_down() {
            self.0.request_shutdown();
        }
    }
}

/// Keep the vision subsystem alive until shutdown
///
/// Starts a camera session whenever the camera is enabled. After a camera
/// failure the camera stays down until it is enabled again.
pub fn supervise_vision(vision: &mut VisionLoop, control: &SharedControlState) {
    let mut failed_activation: Option<u64> = None;
    let mut idle_logged = false;

    loop {
        let snapshot = control.snapshot();
        if snapshot.shutting_down {
            break;
        }

        if !snapshot.camera_enabled || failed_activation == Some(snapshot.activation) {
            if !idle_logged {
                tracing::debug!("vision idle, waiting for camera");
                idle_logged = true;
            }
            std::thread::sleep(vision.frame_interval());
            continue;
        }
        idle_logged = false;

        match vision.run_session(control) {
            SessionOutcome::ShutDown => break,
            SessionOutcome::Disabled => {}
            SessionOutcome::CameraFailed(e) => {
                tracing::error!(error = %e, "camera failed, waiting for camera to be enabled again");
                failed_activation = Some(snapshot.activation);
            }
        }
    }

    tracing::info!(sessions = vision.sessions_started(), "vision supervisor stopped");
}

/// Runs both loops and waits for them to finish
pub struct Orchestrator {
    control: Arc<SharedControlState>,
    vision: VisionLoop,
    listen: ListenLoop,
}

impl Orchestrator {
    #[must_use]
    pub const fn new(
        control: Arc<SharedControlState>,
        vision: VisionLoop,
        listen: ListenLoop,
    ) -> Self {
        Self {
            control,
            vision,
            listen,
        }
    }

    /// Shared control state both loops use
    #[must_use]
    pub const fn control(&self) -> &Arc<SharedControlState> {
        &self.control
    }

    /// Run until both loops have stopped
    ///
    /// # Errors
    ///
    /// Returns `Error::Task` if either loop panicked
    pub async fn run(self) -> Result<RunReport> {
        let Self {
            control,
            mut vision,
            listen,
        } = self;

        let interrupt = {
            let control = Arc::clone(&control);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("interrupt received");
                    control.request_shutdown();
                }
            })
        };

        let vision_task = {
            let control = Arc::clone(&control);
            tokio::task::spawn_blocking(move || {
                let _guard = ShutdownOnExit(Arc::clone(&control));
                supervise_vision(&mut vision, &control);
                (vision.sessions_started(), vision.frames_processed())
            })
        };

        let listen_task = {
            let control = Arc::clone(&control);
            tokio::task::spawn_blocking(move || {
                let _guard = ShutdownOnExit(control);
                listen.run()
            })
        };

        tracing::info!("vision and listen loops started");
        let (vision_result, listen_result) = tokio::join!(vision_task, listen_task);
        interrupt.abort();

        let (sessions_started, frames_processed) =
            vision_result.map_err(|e| Error::Task(format!("vision loop: {e}")))?;
        let listen = listen_result.map_err(|e| Error::Task(format!("listen loop: {e}")))?;

        tracing::info!(
            sessions = sessions_started,
            frames = frames_processed,
            cycles = listen.cycles,
            "all loops stopped"
        );

        Ok(RunReport {
            listen,
            sessions_started,
            frames_processed,
        })
    }
}
