//! Shared test utilities
//!
//! Test doubles for the camera, detector, display, writer and speaker. Each
//! records what it saw into shared handles so a test can inspect them after
//! the loop that owned the double has finished.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use image::RgbImage;
use voice_tracker::config::VisionConfig;
use voice_tracker::vision::{
    Annotation, CameraSession, CameraSource, Detect, DisplaySink, FrameWriter,
};
use voice_tracker::voice::SpeechSpeaker;
use voice_tracker::{BoundingBox, Error, Frame, Result, TargetId};

/// Vision config tuned for fast tests
#[must_use]
pub fn fast_vision_config(capture_path: &Path) -> VisionConfig {
    VisionConfig {
        fps: 1000,
        capture_path: capture_path.to_path_buf(),
        frame_width: 160,
        frame_height: 120,
        ..VisionConfig::default()
    }
}

/// Poll `condition` until it holds or `timeout` elapses
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}

/// Camera producing blank frames, optionally running dry after N frames
#[derive(Clone)]
pub struct BlankCamera {
    pub width: u32,
    pub height: u32,
    pub frames_per_session: Option<u64>,
    pub opens: Arc<AtomicU64>,
}

impl BlankCamera {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames_per_session: None,
            opens: Arc::new(AtomicU64::new(0)),
        }
    }

    #[must_use]
    pub const fn running_dry_after(mut self, frames: u64) -> Self {
        self.frames_per_session = Some(frames);
        self
    }

    pub fn opens(&self) -> u64 {
        self.opens.load(Ordering::SeqCst)
    }
}

impl CameraSource for BlankCamera {
    fn open(&mut self) -> Result<Box<dyn CameraSession>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(BlankSession {
            width: self.width,
            height: self.height,
            limit: self.frames_per_session,
            next: 0,
        }))
    }
}

struct BlankSession {
    width: u32,
    height: u32,
    limit: Option<u64>,
    next: u64,
}

impl CameraSession for BlankSession {
    fn read_frame(&mut self) -> Result<Frame> {
        if self.limit.is_some_and(|limit| self.next >= limit) {
            return Err(Error::Camera("no frame".to_string()));
        }
        let index = self.next;
        self.next += 1;
        Ok(Frame::new(index, RgbImage::new(self.width, self.height)))
    }
}

/// Detector returning scripted boxes per frame index
#[derive(Clone, Default)]
pub struct ScriptedDetector {
    pub frames: Vec<Vec<BoundingBox>>,
    pub calls: Arc<Mutex<Vec<(u64, TargetId)>>>,
}

impl ScriptedDetector {
    #[must_use]
    pub fn new(frames: Vec<Vec<BoundingBox>>) -> Self {
        Self {
            frames,
            calls: Arc::default(),
        }
    }
}

impl Detect for ScriptedDetector {
    fn detect(&self, frame: &Frame, target: TargetId) -> Vec<BoundingBox> {
        self.calls.lock().unwrap().push((frame.index, target));
        usize::try_from(frame.index)
            .ok()
            .and_then(|i| self.frames.get(i))
            .cloned()
            .unwrap_or_default()
    }
}

type FrameHook = Box<dyn FnMut(u64) + Send>;

/// Display recording every frame's annotations
///
/// The optional hook runs after each frame with the count shown so far.
#[derive(Default)]
pub struct RecordingDisplay {
    pub shown: Arc<Mutex<Vec<(u64, Vec<Annotation>)>>>,
    pub closes: Arc<AtomicU64>,
    hook: Option<FrameHook>,
}

impl RecordingDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_hook(mut self, hook: impl FnMut(u64) + Send + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }
}

impl DisplaySink for RecordingDisplay {
    fn show(&mut self, frame: &Frame, annotations: &[Annotation], _wait: Duration) {
        let count = {
            let mut shown = self.shown.lock().unwrap();
            shown.push((frame.index, annotations.to_vec()));
            shown.len() as u64
        };
        if let Some(hook) = self.hook.as_mut() {
            hook(count);
        }
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Pull the entry-side label out of a frame's annotations
#[must_use]
pub fn side_label(annotations: &[Annotation]) -> Option<String> {
    annotations.iter().find_map(|a| match a {
        Annotation::Label { text, .. } => Some(text.clone()),
        Annotation::Box { .. } => None,
    })
}

/// Writer recording which frames were persisted
#[derive(Clone, Default)]
pub struct RecordingWriter {
    pub persisted: Arc<Mutex<Vec<(u64, PathBuf)>>>,
}

impl FrameWriter for RecordingWriter {
    fn persist(&mut self, frame: &Frame, path: &Path) -> Result<()> {
        self.persisted
            .lock()
            .unwrap()
            .push((frame.index, path.to_path_buf()));
        Ok(())
    }
}

/// Speaker recording what it was asked to say
#[derive(Clone, Default)]
pub struct RecordingSpeaker {
    pub said: Arc<Mutex<Vec<String>>>,
}

impl SpeechSpeaker for RecordingSpeaker {
    fn say(&mut self, text: &str) -> Result<()> {
        self.said.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
