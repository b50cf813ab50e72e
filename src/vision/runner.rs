//! Vision loop
//!
//! One call to [`VisionLoop::run_session`] is one `Running` span: it opens a
//! fresh camera session and episode tracker, processes frames at the
//! configured rate, and returns to `Stopped` when the camera is disabled,
//! shutdown is requested, or the camera stops producing frames.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::{
    Annotation, CameraSource, Detect, DetectionEpisodeTracker, DisplaySink, Frame, FrameWriter,
    draw_box,
};
use crate::Error;
use crate::config::VisionConfig;
use crate::control::SharedControlState;
use crate::target::TargetId;

/// Vertical offset of captions from their anchor
const LABEL_OFFSET: u32 = 10;

/// Vision loop lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisionState {
    /// No camera session open
    Stopped,
    /// Camera session open, processing frames
    Running,
}

/// Why a session ended
#[derive(Debug)]
pub enum SessionOutcome {
    /// Camera flag was cleared
    Disabled,
    /// Shutdown was requested
    ShutDown,
    /// Camera could not be opened or returned no frame
    CameraFailed(Error),
}

/// Frame loop over a camera source
pub struct VisionLoop {
    camera: Box<dyn CameraSource>,
    detector: Box<dyn Detect>,
    display: Box<dyn DisplaySink>,
    writer: Box<dyn FrameWriter>,
    frame_interval: Duration,
    min_box_area: u64,
    capture_path: PathBuf,
    state: VisionState,
    sessions_started: u64,
    frames_processed: u64,
}

impl VisionLoop {
    /// Assemble a vision loop from its collaborators
    #[must_use]
    pub fn new(
        camera: Box<dyn CameraSource>,
        detector: Box<dyn Detect>,
        display: Box<dyn DisplaySink>,
        writer: Box<dyn FrameWriter>,
        config: &VisionConfig,
    ) -> Self {
        Self {
            camera,
            detector,
            display,
            writer,
            frame_interval: config.frame_interval(),
            min_box_area: config.min_box_area,
            capture_path: config.capture_path.clone(),
            state: VisionState::Stopped,
            sessions_started: 0,
            frames_processed: 0,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> VisionState {
        self.state
    }

    /// Number of camera sessions opened so far
    #[must_use]
    pub const fn sessions_started(&self) -> u64 {
        self.sessions_started
    }

    /// Number of frames processed across all sessions
    #[must_use]
    pub const fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Target interval between frames
    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Run one camera session until it is stopped
    ///
    /// Control flags are checked once per frame, so a stop request is seen
    /// within one frame interval.
    pub fn run_session(&mut self, control: &SharedControlState) -> SessionOutcome {
        let mut session = match self.camera.open() {
            Ok(session) => session,
            Err(e) => return SessionOutcome::CameraFailed(e),
        };

        self.state = VisionState::Running;
        self.sessions_started += 1;
        tracing::info!(
            session = self.sessions_started,
            interval_ms = self.frame_interval.as_millis(),
            "camera session started"
        );

        let mut tracker = DetectionEpisodeTracker::new(self.min_box_area);
        let mut armed: Option<TargetId> = None;
        let mut frames = 0u64;

        let outcome = loop {
            let tick = Instant::now();
            let snapshot = control.snapshot();
            if snapshot.shutting_down {
                break SessionOutcome::ShutDown;
            }
            if !snapshot.camera_enabled {
                break SessionOutcome::Disabled;
            }

            let mut frame = match session.read_frame() {
                Ok(frame) => frame,
                Err(e) => break SessionOutcome::CameraFailed(e),
            };

            if snapshot.target != armed {
                tracker.reset();
                armed = snapshot.target;
                tracing::info!(target = ?armed, "tracking target");
            }

            let annotations = self.annotate(&mut frame, armed, &mut tracker);

            if control.consume_capture_request() {
                if let Err(e) = self.writer.persist(&frame, &self.capture_path) {
                    tracing::error!(error = %e, "failed to persist capture");
                }
            }

            self.display.show(&frame, &annotations, self.frame_interval);
            frames += 1;
            self.frames_processed += 1;

            if let Some(rest) = self.frame_interval.checked_sub(tick.elapsed()) {
                std::thread::sleep(rest);
            }
        };

        session.close();
        self.display.close();
        self.state = VisionState::Stopped;
        tracing::info!(frames, outcome = ?outcome, "camera session stopped");

        outcome
    }

    /// Detect the armed target, draw boxes, and build overlay annotations
    fn annotate(
        &self,
        frame: &mut Frame,
        target: Option<TargetId>,
        tracker: &mut DetectionEpisodeTracker,
    ) -> Vec<Annotation> {
        let Some(target) = target else {
            return Vec::new();
        };

        let boxes = self.detector.detect(frame, target);
        let side = tracker.update(&boxes, frame.width());

        let mut annotations: Vec<Annotation> = boxes
            .iter()
            .filter(|b| b.area() > self.min_box_area)
            .map(|bbox| {
                draw_box(&mut frame.image, *bbox);
                Annotation::Box {
                    bbox: *bbox,
                    label: target.title().to_string(),
                }
            })
            .collect();

        if let Some(side) = side {
            tracing::trace!(frame = frame.index, %side, "entry side");
            annotations.push(Annotation::Label {
                x: 0,
                y: LABEL_OFFSET,
                text: side.to_string(),
            });
        }

        annotations
    }
}
