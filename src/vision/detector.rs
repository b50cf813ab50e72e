//! Color-signature detection
//!
//! Thresholds each pixel against the target's HSV range, groups matching
//! pixels into 8-connected blobs, and reports each blob's bounding box.

use image::Rgb;

use super::{BoundingBox, Detect, Frame};
use crate::config::VisionConfig;
use crate::target::TargetId;

/// Blobs with this many pixels or fewer are discarded as noise
const MIN_BLOB_PIXELS: usize = 100;

/// Convert an RGB pixel to HSV on the 0–180 / 0–255 / 0–255 scale
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rgb_to_hsv(pixel: Rgb<u8>) -> [u8; 3] {
    let [r, g, b] = pixel.0.map(f32::from);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue_deg = if delta <= f32::EPSILON {
        0.0
    } else if (max - r).abs() <= f32::EPSILON {
        60.0 * ((g - b) / delta)
    } else if (max - g).abs() <= f32::EPSILON {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let hue_deg = if hue_deg < 0.0 { hue_deg + 360.0 } else { hue_deg };

    let saturation = if max <= f32::EPSILON {
        0.0
    } else {
        delta / max * 255.0
    };

    // 359.x degrees rounds up to 180 and wraps back to red
    [
        ((hue_deg / 2.0).round() % 180.0) as u8,
        saturation.round() as u8,
        max as u8,
    ]
}

/// Detector backed by per-target HSV thresholds
#[derive(Debug, Clone)]
pub struct ColorDetector {
    min_blob_pixels: usize,
}

impl Default for ColorDetector {
    fn default() -> Self {
        Self {
            min_blob_pixels: MIN_BLOB_PIXELS,
        }
    }
}

impl ColorDetector {
    /// Create a detector with the default noise floor
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector whose noise floor is the configured minimum box area
    ///
    /// A blob with more pixels than the floor always has a larger box, so the
    /// detector never drops a box the episode tracker would accept.
    #[must_use]
    pub fn for_vision(config: &VisionConfig) -> Self {
        let floor = usize::try_from(config.min_box_area).unwrap_or(usize::MAX);
        Self::new().with_min_blob_pixels(floor)
    }

    /// Override the minimum blob size in pixels
    #[must_use]
    pub const fn with_min_blob_pixels(mut self, pixels: usize) -> Self {
        self.min_blob_pixels = pixels;
        self
    }

    fn mask(frame: &Frame, target: TargetId) -> Vec<bool> {
        let range = target.color_range();
        frame
            .image
            .pixels()
            .map(|p| range.contains(rgb_to_hsv(*p)))
            .collect()
    }
}

impl Detect for ColorDetector {
    fn detect(&self, frame: &Frame, target: TargetId) -> Vec<BoundingBox> {
        let (w, h) = (frame.width() as usize, frame.height() as usize);
        let mut mask = Self::mask(frame, target);
        let mut boxes = Vec::new();
        let mut stack = Vec::new();

        for start in 0..mask.len() {
            if !mask[start] {
                continue;
            }
            mask[start] = false;
            stack.push(start);

            let (mut min_x, mut min_y) = (usize::MAX, usize::MAX);
            let (mut max_x, mut max_y) = (0, 0);
            let mut pixels = 0usize;

            while let Some(idx) = stack.pop() {
                let (x, y) = (idx % w, idx / w);
                pixels += 1;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);

                for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                    for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                        let n = ny * w + nx;
                        if mask[n] {
                            mask[n] = false;
                            stack.push(n);
                        }
                    }
                }
            }

            if pixels > self.min_blob_pixels {
                #[allow(clippy::cast_possible_truncation)]
                boxes.push(BoundingBox::new(
                    min_x as u32,
                    min_y as u32,
                    (max_x - min_x + 1) as u32,
                    (max_y - min_y + 1) as u32,
                ));
            }
        }

        tracing::trace!(frame = frame.index, %target, count = boxes.len(), "detected");
        boxes
    }
}
