//! Vision processing module
//!
//! Camera sessions, color detection, episode tracking, and the frame loop.
//! Camera, display, detection and capture sit behind traits so the loop can
//! run against real devices or test doubles.

mod camera;
mod capture;
mod detector;
mod display;
pub mod episode;
mod runner;

use std::path::Path;
use std::time::Duration;

use image::{Rgb, RgbImage};

pub use camera::{DirectoryCamera, SyntheticCamera};
pub use capture::ImageFileWriter;
pub use detector::{ColorDetector, rgb_to_hsv};
pub use display::LogDisplay;
pub use episode::{DetectionEpisodeTracker, EntrySide};
pub use runner::{SessionOutcome, VisionLoop, VisionState};

use crate::Result;
use crate::target::TargetId;

/// One captured camera frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// Sequence number within the camera session
    pub index: u64,
    /// Pixel data
    pub image: RgbImage,
}

impl Frame {
    /// Wrap an image as a frame
    #[must_use]
    pub const fn new(index: u64, image: RgbImage) -> Self {
        Self { index, image }
    }

    /// Frame width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Axis-aligned box in frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box area in square pixels
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Top-left corner
    #[must_use]
    pub const fn origin(&self) -> (u32, u32) {
        (self.x, self.y)
    }
}

/// Overlay element rendered on top of a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Outlined box with a caption above it
    Box { bbox: BoundingBox, label: String },
    /// Free-standing caption at a position
    Label { x: u32, y: u32, text: String },
}

/// Source of camera sessions
///
/// Each activation of the vision loop opens a fresh session.
pub trait CameraSource: Send {
    /// Open a new camera session
    ///
    /// # Errors
    ///
    /// Returns `Error::Camera` if the device cannot be opened
    fn open(&mut self) -> Result<Box<dyn CameraSession>>;
}

/// An open camera stream
pub trait CameraSession: Send {
    /// Read the next frame
    ///
    /// # Errors
    ///
    /// Returns `Error::Camera` when no frame is available
    fn read_frame(&mut self) -> Result<Frame>;

    /// Release the device
    fn close(&mut self) {}
}

/// Renders annotated frames
pub trait DisplaySink: Send {
    /// Present a frame, waiting up to `wait` for the window to refresh
    fn show(&mut self, frame: &Frame, annotations: &[Annotation], wait: Duration);

    /// Release any window resources
    fn close(&mut self) {}
}

/// Finds bounding boxes of a target's color signature
pub trait Detect: Send {
    /// Return candidate boxes for `target`, in no guaranteed order
    fn detect(&self, frame: &Frame, target: TargetId) -> Vec<BoundingBox>;
}

/// Persists still captures
pub trait FrameWriter: Send {
    /// Write `frame` to `path`, replacing any previous capture
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be encoded or written
    fn persist(&mut self, frame: &Frame, path: &Path) -> Result<()>;
}

/// Outline color for detections
const BOX_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Outline thickness in pixels
const BOX_THICKNESS: u32 = 2;

/// Draw a box outline directly into the frame pixels
pub fn draw_box(image: &mut RgbImage, bbox: BoundingBox) {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 || bbox.width == 0 || bbox.height == 0 {
        return;
    }
    let x0 = bbox.x.min(w - 1);
    let y0 = bbox.y.min(h - 1);
    let x1 = bbox.x.saturating_add(bbox.width - 1).min(w - 1);
    let y1 = bbox.y.saturating_add(bbox.height - 1).min(h - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let on_edge = x < x0 + BOX_THICKNESS
                || x + BOX_THICKNESS > x1
                || y < y0 + BOX_THICKNESS
                || y + BOX_THICKNESS > y1;
            if on_edge {
                image.put_pixel(x, y, BOX_COLOR);
            }
        }
    }
}
