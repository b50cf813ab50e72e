//! Voice Tracker - voice-controlled color object tracker
//!
//! A vision loop scans camera frames for a target fruit by its color
//! signature while a listen loop turns short spoken commands into changes of
//! shared control state.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   Intent   ┌───────────────────┐
//! │  ListenLoop  │ ─────────▶ │ CommandDispatcher │
//! │ listen/speak │            └─────────┬─────────┘
//! └──────────────┘                      │ mutate
//!                             ┌─────────▼──────────┐
//!                             │ SharedControlState │
//!                             └─────────┬──────────┘
//!                                       │ snapshot / consume capture
//! ┌──────────────┐            ┌─────────▼──────────┐
//! │ CameraSource │ ─frames──▶ │     VisionLoop     │ ──▶ display / capture
//! └──────────────┘            └────────────────────┘
//! ```
//!
//! The [`Orchestrator`] runs both loops on separate blocking tasks and joins
//! them once shutdown has been requested.

pub mod command;
pub mod config;
pub mod control;
pub mod error;
pub mod listen;
pub mod orchestrator;
pub mod target;
pub mod vision;
pub mod voice;

pub use command::{CommandDispatcher, Intent, IntentKind, Response, classify};
pub use config::Config;
pub use control::{ControlSnapshot, SharedControlState};
pub use error::{Error, Result};
pub use listen::{ListenLoop, ListenOutcome};
pub use orchestrator::{Orchestrator, RunReport, supervise_vision};
pub use target::TargetId;
pub use vision::{
    BoundingBox, DetectionEpisodeTracker, EntrySide, Frame, SessionOutcome, VisionLoop,
    VisionState,
};
