//! Applies intents to the shared control state

use std::sync::Arc;

use super::classifier::INSTRUCTIONS;
use super::{Intent, IntentKind};
use crate::control::SharedControlState;

/// Feedback for the user after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Phrase to report
    pub text: String,
    /// Speak it aloud (true) or only print it (false)
    pub spoken: bool,
}

impl Response {
    fn spoken(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spoken: true,
        }
    }

    fn printed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spoken: false,
        }
    }
}

/// Build the "here's what I can do" message with a lead-in line
#[must_use]
pub fn instructions_with(lead: &str) -> String {
    std::iter::once(lead)
        .chain(INSTRUCTIONS)
        .collect::<Vec<_>>()
        .join(";\n")
}

/// Maps intents onto control state mutations
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    control: Arc<SharedControlState>,
}

impl CommandDispatcher {
    #[must_use]
    pub const fn new(control: Arc<SharedControlState>) -> Self {
        Self { control }
    }

    /// Greeting announced when listening starts
    #[must_use]
    pub fn greeting() -> Response {
        Response::spoken(instructions_with("Hello, I'm ready to assist you. I can:"))
    }

    /// Apply `intent` and return the phrase to report
    ///
    /// State is mutated before the response is built, so reporting can never
    /// hold up a command.
    pub fn dispatch(&self, intent: &Intent) -> Response {
        tracing::info!(kind = ?intent.kind, target = ?intent.target, text = %intent.text, "dispatching command");

        match (intent.kind, intent.target) {
            (IntentKind::Find, Some(target)) => {
                self.control.set_target(Some(target));
                self.control.set_camera_enabled(true);
                Response::spoken(format!("Start detecting {}...", target.title().to_lowercase()))
            }
            (IntentKind::ToggleCamera, _) => {
                if self.control.toggle_camera_enabled() {
                    Response::spoken("Turning on camera...")
                } else {
                    Response::spoken("Turning off camera...")
                }
            }
            (IntentKind::Capture, _) => {
                self.control.request_capture();
                Response::spoken("Say cheese...")
            }
            (IntentKind::Quit, _) => {
                self.control.request_shutdown();
                self.control.set_camera_enabled(false);
                Response::spoken("Goodbye.")
            }
            (IntentKind::Unrecognized | IntentKind::Find, _) => {
                Response::printed(instructions_with("I misunderstand you..., I can:"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::classify;
    use crate::control::ControlSnapshot;
    use crate::target::TargetId;

    fn dispatcher() -> (CommandDispatcher, Arc<SharedControlState>) {
        let control = Arc::new(SharedControlState::new());
        (CommandDispatcher::new(Arc::clone(&control)), control)
    }

    #[test]
    fn find_arms_target_and_camera() {
        let (dispatcher, control) = dispatcher();
        let response = dispatcher.dispatch(&classify("find the orange"));

        let snap = control.snapshot();
        assert_eq!(snap.target, Some(TargetId::Orange));
        assert!(snap.camera_enabled);
        assert_eq!(response, Response::spoken("Start detecting orange..."));
    }

    #[test]
    fn toggle_reports_new_state() {
        let (dispatcher, control) = dispatcher();
        let on = dispatcher.dispatch(&classify("camera"));
        assert!(control.is_camera_enabled());
        assert_eq!(on.text, "Turning on camera...");

        let off = dispatcher.dispatch(&classify("camera"));
        assert!(!control.is_camera_enabled());
        assert_eq!(off.text, "Turning off camera...");
    }

    #[test]
    fn capture_sets_pending_request() {
        let (dispatcher, control) = dispatcher();
        dispatcher.dispatch(&classify("screenshot"));
        assert!(control.consume_capture_request());
    }

    #[test]
    fn quit_disables_camera_and_shuts_down() {
        let (dispatcher, control) = dispatcher();
        dispatcher.dispatch(&classify("find a lemon"));
        let response = dispatcher.dispatch(&classify("quit"));

        let snap = control.snapshot();
        assert!(snap.shutting_down);
        assert!(!snap.camera_enabled);
        assert_eq!(response.text, "Goodbye.");
    }

    #[test]
    fn unrecognized_changes_nothing() {
        let (dispatcher, control) = dispatcher();
        let response = dispatcher.dispatch(&classify(""));

        assert_eq!(control.snapshot(), ControlSnapshot::default());
        assert!(!response.spoken);
        assert!(response.text.starts_with("I misunderstand you"));
        assert!(response.text.contains("[Quit]"));
    }

    #[test]
    fn greeting_lists_instructions() {
        let greeting = CommandDispatcher::greeting();
        assert!(greeting.spoken);
        assert_eq!(greeting.text.matches(";\n").count(), INSTRUCTIONS.len());
    }
}
