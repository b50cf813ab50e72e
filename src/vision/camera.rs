//! Camera sources
//!
//! `SyntheticCamera` renders a looping scene with fruit moving across the
//! frame; `DirectoryCamera` replays still images from disk in name order.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use super::{CameraSession, CameraSource, Frame};
use crate::target::TargetId;
use crate::{Error, Result};

/// Length of the synthetic scene loop in frames
const SCENE_FRAMES: u64 = 150;

/// Radius of a synthetic fruit in pixels
const FRUIT_RADIUS: i64 = 20;

/// Background color of the synthetic scene
const BACKGROUND: Rgb<u8> = Rgb([30, 30, 30]);

/// Horizontal speed of moving fruit in pixels per frame
const FRUIT_SPEED: i64 = 4;

/// Image extensions accepted by `DirectoryCamera`
const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Representative color for each target, inside its detection range
const fn fruit_color(target: TargetId) -> Rgb<u8> {
    match target {
        TargetId::Orange => Rgb([255, 100, 0]),
        TargetId::Lemon => Rgb([255, 230, 0]),
        TargetId::Tomato => Rgb([230, 20, 10]),
        TargetId::GreenApple => Rgb([80, 200, 40]),
    }
}

/// How a fruit moves during its visible window
#[derive(Debug, Clone, Copy)]
enum Motion {
    /// Enters at the left edge and drifts right
    LeftToRight,
    /// Enters at the right edge and drifts left
    RightToLeft,
    /// Sits at a fixed fraction of the frame width
    Still { x_percent: i64 },
}

/// One object in the synthetic scene
#[derive(Debug, Clone, Copy)]
struct Sprite {
    target: TargetId,
    visible: (u64, u64),
    y_percent: i64,
    motion: Motion,
}

const SCENE: [Sprite; 4] = [
    Sprite {
        target: TargetId::Orange,
        visible: (0, 100),
        y_percent: 30,
        motion: Motion::LeftToRight,
    },
    Sprite {
        target: TargetId::Lemon,
        visible: (40, 140),
        y_percent: 55,
        motion: Motion::RightToLeft,
    },
    Sprite {
        target: TargetId::Tomato,
        visible: (100, 150),
        y_percent: 75,
        motion: Motion::Still { x_percent: 75 },
    },
    Sprite {
        target: TargetId::GreenApple,
        visible: (0, 60),
        y_percent: 75,
        motion: Motion::Still { x_percent: 20 },
    },
];

/// Camera that renders a generated scene
#[derive(Debug, Clone)]
pub struct SyntheticCamera {
    width: u32,
    height: u32,
}

impl SyntheticCamera {
    /// Create a synthetic camera with the given frame size
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl CameraSource for SyntheticCamera {
    fn open(&mut self) -> Result<Box<dyn CameraSession>> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Camera(format!(
                "invalid synthetic frame size {}x{}",
                self.width, self.height
            )));
        }
        tracing::debug!(width = self.width, height = self.height, "synthetic camera opened");
        Ok(Box::new(SyntheticSession {
            width: self.width,
            height: self.height,
            next_index: 0,
        }))
    }
}

struct SyntheticSession {
    width: u32,
    height: u32,
    next_index: u64,
}

impl SyntheticSession {
    fn render(&self, index: u64) -> RgbImage {
        let mut image = RgbImage::from_pixel(self.width, self.height, BACKGROUND);
        let tick = index % SCENE_FRAMES;
        let (w, h) = (i64::from(self.width), i64::from(self.height));

        for sprite in &SCENE {
            let (start, end) = sprite.visible;
            if !(start..end).contains(&tick) {
                continue;
            }
            #[allow(clippy::cast_possible_wrap)]
            let travelled = (tick - start) as i64 * FRUIT_SPEED;
            let cx = match sprite.motion {
                Motion::LeftToRight => FRUIT_RADIUS + travelled,
                Motion::RightToLeft => w - FRUIT_RADIUS - 1 - travelled,
                Motion::Still { x_percent } => w * x_percent / 100,
            };
            let cy = h * sprite.y_percent / 100;
            fill_disc(&mut image, cx, cy, fruit_color(sprite.target));
        }

        image
    }
}

impl CameraSession for SyntheticSession {
    fn read_frame(&mut self) -> Result<Frame> {
        let index = self.next_index;
        self.next_index += 1;
        Ok(Frame::new(index, self.render(index)))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fill_disc(image: &mut RgbImage, cx: i64, cy: i64, color: Rgb<u8>) {
    let (w, h) = (i64::from(image.width()), i64::from(image.height()));
    for y in (cy - FRUIT_RADIUS).max(0)..(cy + FRUIT_RADIUS + 1).min(h) {
        for x in (cx - FRUIT_RADIUS).max(0)..(cx + FRUIT_RADIUS + 1).min(w) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= FRUIT_RADIUS * FRUIT_RADIUS {
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// Camera that replays image files from a directory
#[derive(Debug, Clone)]
pub struct DirectoryCamera {
    dir: PathBuf,
}

impl DirectoryCamera {
    /// Create a camera over the images in `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn frame_paths(dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| Error::Camera(format!("cannot open {}: {e}", dir.display())))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            })
            .collect();
        paths.sort();
        Ok(paths)
    }
}

impl CameraSource for DirectoryCamera {
    fn open(&mut self) -> Result<Box<dyn CameraSession>> {
        let paths = Self::frame_paths(&self.dir)?;
        if paths.is_empty() {
            return Err(Error::Camera(format!(
                "no frames found in {}",
                self.dir.display()
            )));
        }
        tracing::debug!(dir = %self.dir.display(), frames = paths.len(), "directory camera opened");
        Ok(Box::new(DirectorySession {
            paths: paths.into_iter(),
            next_index: 0,
        }))
    }
}

struct DirectorySession {
    paths: std::vec::IntoIter<PathBuf>,
    next_index: u64,
}

impl CameraSession for DirectorySession {
    fn read_frame(&mut self) -> Result<Frame> {
        let path = self
            .paths
            .next()
            .ok_or_else(|| Error::Camera("no frame available".to_string()))?;
        let image = image::open(&path)
            .map_err(|e| Error::Camera(format!("cannot decode {}: {e}", path.display())))?
            .to_rgb8();

        let index = self.next_index;
        self.next_index += 1;
        Ok(Frame::new(index, image))
    }

    fn close(&mut self) {
        self.paths = Vec::new().into_iter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::{ColorDetector, Detect};

    #[test]
    fn synthetic_scene_shows_orange_on_the_left_first() {
        let mut camera = SyntheticCamera::new(320, 240);
        let mut session = camera.open().unwrap();
        let frame = session.read_frame().unwrap();

        let boxes = ColorDetector::new().detect(&frame, TargetId::Orange);
        assert_eq!(boxes.len(), 1);
        assert!(boxes[0].x < 160);
        assert!(ColorDetector::new().detect(&frame, TargetId::Lemon).is_empty());
    }

    #[test]
    fn synthetic_frames_are_numbered_per_session() {
        let mut camera = SyntheticCamera::new(64, 48);
        let mut session = camera.open().unwrap();
        assert_eq!(session.read_frame().unwrap().index, 0);
        assert_eq!(session.read_frame().unwrap().index, 1);

        let mut fresh = camera.open().unwrap();
        assert_eq!(fresh.read_frame().unwrap().index, 0);
    }

    #[test]
    fn zero_sized_synthetic_camera_fails_to_open() {
        assert!(matches!(
            SyntheticCamera::new(0, 10).open(),
            Err(Error::Camera(_))
        ));
    }

    #[test]
    fn directory_camera_replays_then_runs_dry() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.png"] {
            RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]))
                .save(dir.path().join(name))
                .unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut camera = DirectoryCamera::new(dir.path());
        let mut session = camera.open().unwrap();
        assert_eq!(session.read_frame().unwrap().index, 0);
        assert_eq!(session.read_frame().unwrap().width(), 4);
        assert!(matches!(session.read_frame(), Err(Error::Camera(_))));
    }

    #[test]
    fn empty_directory_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DirectoryCamera::new(dir.path()).open(),
            Err(Error::Camera(_))
        ));
    }
}
