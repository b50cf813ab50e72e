//! Detection episode tracking
//!
//! An episode is an uninterrupted run of frames in which the armed target is
//! visible. The side an object entered from is decided by where it was first
//! seen and stays fixed until the object disappears.

use std::fmt;

use super::BoundingBox;

/// Minimum box area (px²) for a detection to count as the target
pub const DEFAULT_MIN_AREA: u64 = 100;

/// Half of the frame the target first appeared in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySide {
    Left,
    Right,
}

impl fmt::Display for EntrySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Remembers where the current episode began
#[derive(Debug, Clone)]
pub struct DetectionEpisodeTracker {
    first_box_origin: Option<(u32, u32)>,
    min_area: u64,
}

impl Default for DetectionEpisodeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_AREA)
    }
}

impl DetectionEpisodeTracker {
    /// Create a tracker that ignores boxes at or below `min_area`
    #[must_use]
    pub const fn new(min_area: u64) -> Self {
        Self {
            first_box_origin: None,
            min_area,
        }
    }

    /// Feed one frame's detections
    ///
    /// Returns the entry side while the target is visible and `None` once it
    /// is gone. When several boxes qualify on the first frame, the first one
    /// returned by the detector wins; detector order is not stable across
    /// frames.
    pub fn update(&mut self, boxes: &[BoundingBox], frame_width: u32) -> Option<EntrySide> {
        let Some(first) = boxes.iter().find(|b| b.area() > self.min_area) else {
            if self.first_box_origin.take().is_some() {
                tracing::debug!("target lost, episode reset");
            }
            return None;
        };

        let origin = *self.first_box_origin.get_or_insert_with(|| {
            tracing::debug!(x = first.x, y = first.y, "new episode");
            first.origin()
        });

        // x < width / 2 without integer truncation
        if u64::from(origin.0) * 2 < u64::from(frame_width) {
            Some(EntrySide::Left)
        } else {
            Some(EntrySide::Right)
        }
    }

    /// Origin of the box that opened the current episode
    #[must_use]
    pub const fn first_origin(&self) -> Option<(u32, u32)> {
        self.first_box_origin
    }

    /// Forget the current episode
    pub fn reset(&mut self) {
        self.first_box_origin = None;
    }
}
