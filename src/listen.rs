//! Listen loop
//!
//! Acquire an utterance, classify it, dispatch it, report back. Repeats until
//! a quit command is dispatched or shutdown is requested elsewhere.

use std::sync::Arc;
use std::time::Duration;

use crate::command::{CommandDispatcher, Response, classify};
use crate::control::SharedControlState;
use crate::voice::{SpeechListener, SpeechSpeaker};

/// How a listen loop run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenOutcome {
    /// Utterance cycles completed, timeouts included
    pub cycles: u64,
    /// Whether the loop ended on a quit command
    pub quit_requested: bool,
}

/// Voice command loop
pub struct ListenLoop {
    listener: Box<dyn SpeechListener>,
    speaker: Box<dyn SpeechSpeaker>,
    dispatcher: CommandDispatcher,
    control: Arc<SharedControlState>,
    timeout: Duration,
    greet: bool,
}

impl ListenLoop {
    /// Create a listen loop
    ///
    /// The speaker is owned for the loop's whole life.
    #[must_use]
    pub fn new(
        listener: Box<dyn SpeechListener>,
        speaker: Box<dyn SpeechSpeaker>,
        control: Arc<SharedControlState>,
        timeout: Duration,
    ) -> Self {
        Self {
            listener,
            speaker,
            dispatcher: CommandDispatcher::new(Arc::clone(&control)),
            control,
            timeout,
            greet: true,
        }
    }

    /// Skip the startup greeting
    #[must_use]
    pub const fn without_greeting(mut self) -> Self {
        self.greet = false;
        self
    }

    /// Run until quit or shutdown
    pub fn run(mut self) -> ListenOutcome {
        if self.greet {
            self.respond(&CommandDispatcher::greeting());
        }

        let mut cycles = 0u64;
        loop {
            if self.control.is_shutting_down() {
                tracing::info!(cycles, "listen loop stopping for shutdown");
                return ListenOutcome {
                    cycles,
                    quit_requested: false,
                };
            }

            let quit = self.cycle();
            cycles += 1;

            if quit {
                tracing::info!(cycles, "listen loop stopping on quit command");
                return ListenOutcome {
                    cycles,
                    quit_requested: true,
                };
            }
        }
    }

    /// One listen → classify → dispatch → respond pass
    ///
    /// Returns true if a quit command was dispatched.
    pub fn cycle(&mut self) -> bool {
        let text = match self.listener.listen(self.timeout) {
            Ok(Some(text)) => {
                tracing::info!(text = %text, "heard");
                text
            }
            Ok(None) => {
                tracing::debug!("no utterance before timeout");
                String::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "listener failed");
                String::new()
            }
        };

        let intent = classify(&text);
        let response = self.dispatcher.dispatch(&intent);
        self.respond(&response);

        intent.is_quit()
    }

    fn respond(&mut self, response: &Response) {
        if !response.spoken {
            println!("{}", response.text);
            return;
        }
        if let Err(e) = self.speaker.say(&response.text) {
            tracing::warn!(error = %e, "failed to speak response");
            println!("{}", response.text);
        }
    }
}
