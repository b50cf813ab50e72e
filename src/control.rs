//! Shared control state
//!
//! The only channel between the listen loop and the vision loop. Every field
//! lives behind one mutex so that a reader always sees a fully committed
//! record, and capture requests are consumed exactly once.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::target::TargetId;

/// Point-in-time copy of the control record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlSnapshot {
    /// Armed target, if any
    pub target: Option<TargetId>,
    /// Whether the camera should be running
    pub camera_enabled: bool,
    /// Whether a still capture is pending
    pub capture_requested: bool,
    /// Whether the process is shutting down
    pub shutting_down: bool,
    /// Bumped every time the camera is (re)enabled
    pub activation: u64,
}

/// Mutex-guarded control record shared by both loops
#[derive(Debug, Default)]
pub struct SharedControlState {
    inner: Mutex<ControlSnapshot>,
}

impl SharedControlState {
    /// Create a state with no target and the camera off
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // The record is plain Copy data, so a poisoned lock still holds a
    // consistent value.
    fn lock(&self) -> MutexGuard<'_, ControlSnapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy the whole record atomically
    #[must_use]
    pub fn snapshot(&self) -> ControlSnapshot {
        *self.lock()
    }

    /// Currently armed target
    #[must_use]
    pub fn target(&self) -> Option<TargetId> {
        self.lock().target
    }

    /// Whether the camera is enabled
    #[must_use]
    pub fn is_camera_enabled(&self) -> bool {
        self.lock().camera_enabled
    }

    /// Arm or disarm the target
    pub fn set_target(&self, target: Option<TargetId>) {
        self.lock().target = target;
        tracing::debug!(target = ?target, "target updated");
    }

    /// Enable or disable the camera
    ///
    /// Enabling always counts as a new activation, even if the camera was
    /// already on. Enabling is refused once shutdown has been requested.
    pub fn set_camera_enabled(&self, enabled: bool) {
        let mut state = self.lock();
        if enabled && state.shutting_down {
            drop(state);
            tracing::warn!("ignoring camera enable during shutdown");
            return;
        }
        state.camera_enabled = enabled;
        if enabled {
            state.activation += 1;
        }
        let activation = state.activation;
        drop(state);
        tracing::debug!(enabled, activation, "camera flag updated");
    }

    /// Flip the camera flag, returning the new value
    pub fn toggle_camera_enabled(&self) -> bool {
        let mut state = self.lock();
        if state.shutting_down {
            return state.camera_enabled;
        }
        state.camera_enabled = !state.camera_enabled;
        if state.camera_enabled {
            state.activation += 1;
        }
        let enabled = state.camera_enabled;
        drop(state);
        tracing::debug!(enabled, "camera flag toggled");
        enabled
    }

    /// Ask the vision loop to persist its next frame
    pub fn request_capture(&self) {
        self.lock().capture_requested = true;
    }

    /// Read and clear the capture flag in one step
    #[must_use]
    pub fn consume_capture_request(&self) -> bool {
        std::mem::take(&mut self.lock().capture_requested)
    }

    /// Signal both loops to stop
    pub fn request_shutdown(&self) {
        self.lock().shutting_down = true;
        tracing::info!("shutdown requested");
    }

    /// Whether shutdown has been requested
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.lock().shutting_down
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn new_state_is_idle() {
        let state = SharedControlState::new();
        assert_eq!(state.snapshot(), ControlSnapshot::default());
    }

    #[test]
    fn consume_capture_is_one_shot() {
        let state = SharedControlState::new();
        state.request_capture();
        assert!(state.consume_capture_request());
        assert!(!state.consume_capture_request());
    }

    #[test]
    fn toggle_counts_activation_only_when_turning_on() {
        let state = SharedControlState::new();
        assert!(state.toggle_camera_enabled());
        assert_eq!(state.snapshot().activation, 1);
        assert!(!state.toggle_camera_enabled());
        assert_eq!(state.snapshot().activation, 1);
        state.set_camera_enabled(true);
        state.set_camera_enabled(true);
        assert_eq!(state.snapshot().activation, 3);
    }

    #[test]
    fn shutdown_blocks_camera_enable() {
        let state = SharedControlState::new();
        state.request_shutdown();
        state.set_camera_enabled(true);
        assert!(!state.is_camera_enabled());
        assert!(!state.toggle_camera_enabled());
        assert!(state.is_shutting_down());
    }

    #[test]
    fn concurrent_consumers_see_each_request_once() {
        let state = Arc::new(SharedControlState::new());
        state.request_capture();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                thread::spawn(move || state.consume_capture_request())
            })
            .collect();

        let observed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|seen| *seen)
            .count();
        assert_eq!(observed, 1);
    }

    #[test]
    fn readers_never_see_torn_records() {
        // The writer keeps target and camera flag in lockstep; a reader must
        // never observe one without the other.
        let state = Arc::new(SharedControlState::new());
        let writer = {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                for i in 0..2000 {
                    let mut guard = state.lock();
                    if i % 2 == 0 {
                        guard.target = Some(TargetId::Lemon);
                        guard.camera_enabled = true;
                    } else {
                        guard.target = None;
                        guard.camera_enabled = false;
                    }
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let state = Arc::clone(&state);
                thread::spawn(move || {
                    for _ in 0..2000 {
                        let snap = state.snapshot();
                        assert_eq!(snap.target.is_some(), snap.camera_enabled);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
