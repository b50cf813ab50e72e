//! Configuration management for the voice tracker
//!
//! Values are layered env > TOML file > default.

pub mod file;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::target::TargetId;
use crate::{Error, Result};

/// Default frames per second
pub const DEFAULT_FPS: u32 = 30;

/// Default capture file, overwritten on every capture
pub const DEFAULT_CAPTURE_PATH: &str = "captured_image.bmp";

/// Default utterance timeout in seconds
pub const DEFAULT_LISTEN_TIMEOUT_SECS: f64 = 10.0;

/// Voice tracker configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Vision configuration
    pub vision: VisionConfig,

    /// Speech configuration
    pub speech: SpeechConfig,

    /// Target armed before the first command
    pub initial_target: Option<TargetId>,
}

/// Camera and detection configuration
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Frames per second the loop aims for
    pub fps: u32,

    /// Minimum box area (px²) for a detection to count as the target
    pub min_box_area: u64,

    /// Where still captures are written
    pub capture_path: PathBuf,

    /// Frame source
    pub camera: CameraKind,

    /// Synthetic frame width
    pub frame_width: u32,

    /// Synthetic frame height
    pub frame_height: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            min_box_area: crate::vision::episode::DEFAULT_MIN_AREA,
            capture_path: PathBuf::from(DEFAULT_CAPTURE_PATH),
            camera: CameraKind::Synthetic,
            frame_width: 640,
            frame_height: 480,
        }
    }
}

impl VisionConfig {
    /// Time budget for one frame
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }
}

/// Speech input/output configuration
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// How long to wait for one utterance
    pub listen_timeout: Duration,

    /// Speech output backend
    pub speaker: SpeakerKind,

    /// Speaking rate in words per minute
    pub rate: u32,

    /// Output volume (0.0 to 1.0)
    pub volume: f32,

    /// Utterance script replacing the microphone
    pub script: Option<PathBuf>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            listen_timeout: Duration::from_secs_f64(DEFAULT_LISTEN_TIMEOUT_SECS),
            speaker: SpeakerKind::Auto,
            rate: 175,
            volume: 1.0,
            script: None,
        }
    }
}

/// Frame source selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraKind {
    /// Generated scene
    Synthetic,
    /// Replay images from a directory
    Directory(PathBuf),
}

impl FromStr for CameraKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" => Err(Error::Config("camera must not be empty".to_string())),
            "synthetic" => Ok(Self::Synthetic),
            path => Ok(Self::Directory(PathBuf::from(path))),
        }
    }
}

/// Speech output backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakerKind {
    /// `espeak` when installed, console otherwise
    Auto,
    /// Print responses only
    Console,
    /// Speak through the `espeak` binary
    Espeak,
}

impl FromStr for SpeakerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "console" => Ok(Self::Console),
            "espeak" => Ok(Self::Espeak),
            other => Err(Error::Config(format!("unknown speaker backend: {other}"))),
        }
    }
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if a value is present but invalid
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if a value is present but invalid
    pub fn from_sources(
        fc: file::TrackerConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let defaults = VisionConfig::default();

        let fps = match env("TRACKER_FPS") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| Error::Config(format!("invalid TRACKER_FPS: {raw}")))?,
            None => fc.vision.fps.unwrap_or(defaults.fps),
        };

        let camera = env("TRACKER_CAMERA")
            .or(fc.vision.camera)
            .map(|s| s.parse::<CameraKind>())
            .transpose()?
            .unwrap_or(defaults.camera);

        let vision = VisionConfig {
            fps,
            min_box_area: fc.vision.min_box_area.unwrap_or(defaults.min_box_area),
            capture_path: env("TRACKER_CAPTURE_PATH")
                .or(fc.vision.capture_path)
                .map_or(defaults.capture_path, PathBuf::from),
            camera,
            frame_width: fc.vision.frame_width.unwrap_or(defaults.frame_width),
            frame_height: fc.vision.frame_height.unwrap_or(defaults.frame_height),
        };

        let speech_defaults = SpeechConfig::default();

        let timeout_secs = match env("TRACKER_LISTEN_TIMEOUT") {
            Some(raw) => raw
                .parse::<f64>()
                .map_err(|_| Error::Config(format!("invalid TRACKER_LISTEN_TIMEOUT: {raw}")))?,
            None => fc
                .speech
                .listen_timeout_secs
                .unwrap_or(DEFAULT_LISTEN_TIMEOUT_SECS),
        };

        let speech = SpeechConfig {
            listen_timeout: listen_timeout(timeout_secs)?,
            speaker: env("TRACKER_SPEAKER")
                .or(fc.speech.speaker)
                .map(|s| s.parse::<SpeakerKind>())
                .transpose()?
                .unwrap_or(speech_defaults.speaker),
            rate: fc.speech.rate.unwrap_or(speech_defaults.rate),
            volume: fc.speech.volume.unwrap_or(speech_defaults.volume),
            script: env("TRACKER_SCRIPT")
                .or(fc.speech.script)
                .map(PathBuf::from),
        };

        let config = Self {
            vision,
            speech,
            initial_target: fc.initial_target,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants
    ///
    /// # Errors
    ///
    /// Returns error if a value is out of range
    pub fn validate(&self) -> Result<()> {
        if self.vision.fps == 0 {
            return Err(Error::Config("fps must be at least 1".to_string()));
        }
        if self.vision.fps > 1000 {
            return Err(Error::Config("fps must be at most 1000".to_string()));
        }
        if self.speech.listen_timeout.is_zero() {
            return Err(Error::Config("listen timeout must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.speech.volume) {
            return Err(Error::Config("volume must be between 0.0 and 1.0".to_string()));
        }
        Ok(())
    }
}

/// Convert a timeout in seconds
///
/// # Errors
///
/// Returns error if `secs` is not positive or does not fit in a `Duration`
pub fn listen_timeout(secs: f64) -> Result<Duration> {
    if secs.is_nan() || secs <= 0.0 {
        return Err(Error::Config(format!("listen timeout must be positive, got {secs}")));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| Error::Config(format!("listen timeout {secs} out of range: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_sources() {
        let config = Config::from_sources(file::TrackerConfigFile::default(), env_from(&[])).unwrap();

        assert_eq!(config.vision.fps, 30);
        assert_eq!(config.vision.frame_interval(), Duration::from_millis(33));
        assert_eq!(config.vision.capture_path, PathBuf::from("captured_image.bmp"));
        assert_eq!(config.vision.camera, CameraKind::Synthetic);
        assert_eq!(config.speech.listen_timeout, Duration::from_secs(10));
        assert_eq!(config.speech.speaker, SpeakerKind::Auto);
        assert!(config.initial_target.is_none());
    }

    #[test]
    fn env_overrides_file() {
        let fc = file::parse_config(
            r#"
            [vision]
            fps = 10
            camera = "synthetic"

            [speech]
            listen_timeout_secs = 4.5
            "#,
        )
        .unwrap();
        let env = env_from(&[
            ("TRACKER_FPS", "20"),
            ("TRACKER_CAMERA", "/data/frames"),
            ("TRACKER_SPEAKER", "console"),
        ]);

        let config = Config::from_sources(fc, env).unwrap();
        assert_eq!(config.vision.fps, 20);
        assert_eq!(config.vision.frame_interval(), Duration::from_millis(50));
        assert_eq!(
            config.vision.camera,
            CameraKind::Directory(PathBuf::from("/data/frames"))
        );
        assert_eq!(config.speech.listen_timeout, Duration::from_secs_f64(4.5));
        assert_eq!(config.speech.speaker, SpeakerKind::Console);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let zero_fps = Config::from_sources(
            file::TrackerConfigFile::default(),
            env_from(&[("TRACKER_FPS", "0")]),
        );
        assert!(matches!(zero_fps, Err(Error::Config(_))));

        let bad_timeout = Config::from_sources(
            file::TrackerConfigFile::default(),
            env_from(&[("TRACKER_LISTEN_TIMEOUT", "-1")]),
        );
        assert!(matches!(bad_timeout, Err(Error::Config(_))));

        let bad_speaker = Config::from_sources(
            file::TrackerConfigFile::default(),
            env_from(&[("TRACKER_SPEAKER", "festival")]),
        );
        assert!(matches!(bad_speaker, Err(Error::Config(_))));
    }

    #[test]
    fn listen_timeout_bounds() {
        assert_eq!(listen_timeout(2.5).unwrap(), Duration::from_millis(2500));
        assert!(matches!(listen_timeout(0.0), Err(Error::Config(_))));
        assert!(matches!(listen_timeout(f64::NAN), Err(Error::Config(_))));
        assert!(matches!(listen_timeout(f64::INFINITY), Err(Error::Config(_))));
        assert!(matches!(listen_timeout(1e20), Err(Error::Config(_))));

        let huge = Config::from_sources(
            file::TrackerConfigFile::default(),
            env_from(&[("TRACKER_LISTEN_TIMEOUT", "1e20")]),
        );
        assert!(matches!(huge, Err(Error::Config(_))));
    }

    #[test]
    fn speaker_kind_parsing() {
        assert_eq!("AUTO".parse::<SpeakerKind>().unwrap(), SpeakerKind::Auto);
        assert_eq!(" espeak ".parse::<SpeakerKind>().unwrap(), SpeakerKind::Espeak);
        assert!("".parse::<CameraKind>().is_err());
    }
}
