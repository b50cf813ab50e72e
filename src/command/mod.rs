//! Voice command handling
//!
//! Transcribed text is classified into an [`Intent`] by an ordered rule table,
//! then applied to the shared control state by the [`CommandDispatcher`].

mod classifier;
mod dispatch;

pub use classifier::{INSTRUCTIONS, classify, normalize};
pub use dispatch::{CommandDispatcher, Response, instructions_with};

use crate::target::TargetId;

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    /// Arm a target and start the camera
    Find,
    /// Flip the camera on or off
    ToggleCamera,
    /// Save the next frame
    Capture,
    /// Stop everything
    Quit,
    /// Nothing matched
    Unrecognized,
}

/// Classified utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    /// Command kind
    pub kind: IntentKind,
    /// Target payload, present only for `Find`
    pub target: Option<TargetId>,
    /// Normalized text the intent was classified from
    pub text: String,
}

impl Intent {
    /// Intent with no payload
    #[must_use]
    pub const fn new(kind: IntentKind, text: String) -> Self {
        Self {
            kind,
            target: None,
            text,
        }
    }

    /// `Find` intent for a target
    #[must_use]
    pub const fn find(target: TargetId, text: String) -> Self {
        Self {
            kind: IntentKind::Find,
            target: Some(target),
            text,
        }
    }

    /// Whether this intent ends the session
    #[must_use]
    pub const fn is_quit(&self) -> bool {
        matches!(self.kind, IntentKind::Quit)
    }
}
