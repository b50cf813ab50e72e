//! Spoken responses
//!
//! One speaker is built at startup and kept for the life of the process.

use std::path::PathBuf;
use std::process::Command;

use super::SpeechSpeaker;
use crate::config::{SpeakerKind, SpeechConfig};
use crate::{Error, Result};

/// Prints responses instead of speaking them
#[derive(Debug, Default)]
pub struct ConsoleSpeaker;

impl SpeechSpeaker for ConsoleSpeaker {
    fn say(&mut self, text: &str) -> Result<()> {
        println!("[ASSISTANT] {text}");
        Ok(())
    }
}

/// Speaks through the `espeak` command-line synthesizer
#[derive(Debug, Clone)]
pub struct EspeakSpeaker {
    binary: PathBuf,
    rate: u32,
    amplitude: u32,
}

impl EspeakSpeaker {
    /// Locate `espeak` on `PATH`
    ///
    /// # Errors
    ///
    /// Returns `Error::ModelLoad` if the binary is not installed
    pub fn new(rate: u32, volume: f32) -> Result<Self> {
        let binary = which::which("espeak")
            .map_err(|e| Error::ModelLoad(format!("espeak not found: {e}")))?;

        tracing::debug!(binary = %binary.display(), rate, volume, "espeak speaker initialized");

        Ok(Self {
            binary,
            rate,
            amplitude: amplitude_for(volume),
        })
    }
}

/// Map a 0.0–1.0 volume onto espeak's 0–200 amplitude, where 100 is normal
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn amplitude_for(volume: f32) -> u32 {
    (volume.clamp(0.0, 2.0) * 100.0).round() as u32
}

impl SpeechSpeaker for EspeakSpeaker {
    fn say(&mut self, text: &str) -> Result<()> {
        println!("[ASSISTANT] {text}");

        let output = Command::new(&self.binary)
            .arg("-s")
            .arg(self.rate.to_string())
            .arg("-a")
            .arg(self.amplitude.to_string())
            .arg("--")
            .arg(text)
            .output()
            .map_err(|e| Error::Speech(format!("failed to run espeak: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Speech(format!("espeak failed: {stderr}")));
        }

        Ok(())
    }
}

/// Build the process-wide speaker
///
/// `Auto` prefers espeak and falls back to the console.
///
/// # Errors
///
/// Returns `Error::ModelLoad` if an explicitly requested backend is unavailable
pub fn create_speaker(config: &SpeechConfig) -> Result<Box<dyn SpeechSpeaker>> {
    match config.speaker {
        SpeakerKind::Console => Ok(Box::new(ConsoleSpeaker)),
        SpeakerKind::Espeak => Ok(Box::new(EspeakSpeaker::new(config.rate, config.volume)?)),
        SpeakerKind::Auto => match EspeakSpeaker::new(config.rate, config.volume) {
            Ok(speaker) => Ok(Box::new(speaker)),
            Err(e) => {
                tracing::info!(reason = %e, "falling back to console speaker");
                Ok(Box::new(ConsoleSpeaker))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_maps_to_amplitude() {
        assert_eq!(amplitude_for(1.0), 100);
        assert_eq!(amplitude_for(0.5), 50);
        assert_eq!(amplitude_for(-1.0), 0);
    }

    #[test]
    fn console_speaker_never_fails() {
        let mut speaker = ConsoleSpeaker;
        assert!(speaker.say("hello").is_ok());
    }

    #[test]
    fn auto_speaker_always_builds() {
        let config = SpeechConfig::default();
        assert!(create_speaker(&config).is_ok());
    }
}
