//! Utterance sources
//!
//! `StdinListener` treats each typed line as one transcribed utterance.
//! `ScriptListener` replays utterances from a file, one per line.

use std::collections::VecDeque;
use std::io::BufRead;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use super::SpeechListener;
use crate::{Error, Result};

/// Reads utterances typed on standard input
///
/// A reader thread forwards lines into a channel so that `listen` can honor
/// its timeout. The thread exits at end of input.
pub struct StdinListener {
    lines: Receiver<String>,
    closed: bool,
}

impl StdinListener {
    /// Start the stdin reader thread
    ///
    /// # Errors
    ///
    /// Returns `Error::ModelLoad` if the reader thread cannot be spawned
    pub fn new() -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        std::thread::Builder::new()
            .name("stdin-listener".to_string())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else { break };
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                tracing::debug!("stdin closed");
            })
            .map_err(|e| Error::ModelLoad(format!("stdin reader: {e}")))?;

        Ok(Self::from_receiver(rx))
    }

    /// Build a listener over an existing line channel
    #[must_use]
    pub const fn from_receiver(lines: Receiver<String>) -> Self {
        Self {
            lines,
            closed: false,
        }
    }
}

impl SpeechListener for StdinListener {
    fn listen(&mut self, timeout: Duration) -> Result<Option<String>> {
        if self.closed {
            // Behave like a silent microphone once input is exhausted
            std::thread::sleep(timeout);
            return Ok(None);
        }

        match self.lines.recv_timeout(timeout) {
            Ok(line) => {
                let text = line.trim();
                Ok((!text.is_empty()).then(|| text.to_string()))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                tracing::info!("input closed, listener is now silent");
                self.closed = true;
                Ok(None)
            }
        }
    }
}

/// Replays utterances from a script
///
/// Blank lines stand for a timeout. Lines starting with `#` are ignored.
/// Once the script runs out every call times out.
#[derive(Debug, Clone)]
pub struct ScriptListener {
    utterances: VecDeque<Option<String>>,
    pace: Duration,
}

impl ScriptListener {
    /// Load a script file
    ///
    /// # Errors
    ///
    /// Returns `Error::ModelLoad` if the file cannot be read
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ModelLoad(format!("{}: {e}", path.display())))?;
        let listener = Self::from_script(&content);
        tracing::info!(
            path = %path.display(),
            utterances = listener.remaining(),
            "loaded utterance script"
        );
        Ok(listener)
    }

    /// Build a listener from script text
    #[must_use]
    pub fn from_script(content: &str) -> Self {
        let utterances = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with('#'))
            .map(|line| (!line.is_empty()).then(|| line.to_string()))
            .collect();

        Self {
            utterances,
            pace: Duration::ZERO,
        }
    }

    /// Delay before each scripted utterance is delivered
    #[must_use]
    pub const fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Utterances not yet delivered
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.utterances.len()
    }
}

impl SpeechListener for ScriptListener {
    fn listen(&mut self, timeout: Duration) -> Result<Option<String>> {
        match self.utterances.pop_front() {
            Some(Some(text)) => {
                std::thread::sleep(self.pace.min(timeout));
                Ok(Some(text))
            }
            Some(None) => {
                std::thread::sleep(self.pace.min(timeout));
                Ok(None)
            }
            None => {
                std::thread::sleep(timeout);
                Ok(None)
            }
        }
    }
}
