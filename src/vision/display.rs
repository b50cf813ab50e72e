//! Headless display sink

use std::time::Duration;

use super::{Annotation, DisplaySink, Frame};

/// Display that reports frames through tracing instead of a window
///
/// Logs every frame at trace level and label changes at info, so a headless
/// run still shows what the tracker sees.
#[derive(Debug, Default)]
pub struct LogDisplay {
    last_labels: Vec<String>,
    frames_shown: u64,
}

impl LogDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames shown since creation
    #[must_use]
    pub const fn frames_shown(&self) -> u64 {
        self.frames_shown
    }
}

impl DisplaySink for LogDisplay {
    fn show(&mut self, frame: &Frame, annotations: &[Annotation], wait: Duration) {
        self.frames_shown += 1;

        let labels: Vec<String> = annotations
            .iter()
            .map(|a| match a {
                Annotation::Box { label, .. } => label.clone(),
                Annotation::Label { text, .. } => text.clone(),
            })
            .collect();

        tracing::trace!(
            frame = frame.index,
            annotations = annotations.len(),
            wait_ms = wait.as_millis(),
            "frame shown"
        );

        if labels != self.last_labels {
            if labels.is_empty() {
                tracing::info!(frame = frame.index, "nothing in view");
            } else {
                tracing::info!(frame = frame.index, labels = ?labels, "in view");
            }
            self.last_labels = labels;
        }
    }

    fn close(&mut self) {
        tracing::debug!(frames = self.frames_shown, "display closed");
        self.last_labels.clear();
    }
}
