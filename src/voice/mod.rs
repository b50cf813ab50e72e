//! Voice processing module
//!
//! Utterance acquisition and spoken responses. Transcription backends sit
//! behind [`SpeechListener`]; output backends behind [`SpeechSpeaker`].

mod listener;
mod speaker;

use std::time::Duration;

pub use listener::{ScriptListener, StdinListener};
pub use speaker::{ConsoleSpeaker, EspeakSpeaker, create_speaker};

use crate::Result;

/// Produces transcribed utterances
pub trait SpeechListener: Send {
    /// Wait up to `timeout` for one utterance
    ///
    /// Returns `Ok(None)` on timeout, which is not an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::Speech` if the input device fails
    fn listen(&mut self, timeout: Duration) -> Result<Option<String>>;
}

/// Speaks responses back to the user
pub trait SpeechSpeaker: Send {
    /// Speak `text`, blocking until playback finishes
    ///
    /// # Errors
    ///
    /// Returns `Error::Speech` if playback fails
    fn say(&mut self, text: &str) -> Result<()>;
}
