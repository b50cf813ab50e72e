//! TOML configuration file loading
//!
//! Supports `~/.config/voice-tracker/config.toml` as a persistent config source.
//! All fields are optional. The file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::target::TargetId;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct TrackerConfigFile {
    /// Camera and detection configuration
    #[serde(default)]
    pub vision: VisionFileConfig,

    /// Speech input/output configuration
    #[serde(default)]
    pub speech: SpeechFileConfig,

    /// Target to arm at startup
    #[serde(default)]
    pub initial_target: Option<TargetId>,
}

/// Vision configuration
#[derive(Debug, Default, Deserialize)]
pub struct VisionFileConfig {
    /// Frames per second
    pub fps: Option<u32>,

    /// Minimum bounding box area (px²) for a detection to count
    pub min_box_area: Option<u64>,

    /// Where still captures are written
    pub capture_path: Option<String>,

    /// `synthetic` or a directory of frame images
    pub camera: Option<String>,

    /// Synthetic frame width
    pub frame_width: Option<u32>,

    /// Synthetic frame height
    pub frame_height: Option<u32>,
}

/// Speech configuration
#[derive(Debug, Default, Deserialize)]
pub struct SpeechFileConfig {
    /// Seconds to wait for one utterance
    pub listen_timeout_secs: Option<f64>,

    /// `auto`, `console`, or `espeak`
    pub speaker: Option<String>,

    /// Speaking rate in words per minute
    pub rate: Option<u32>,

    /// Output volume (0.0 to 1.0)
    pub volume: Option<f32>,

    /// Utterance script file replacing the microphone
    pub script: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// A missing file, or one that can't be read or parsed, yields the defaults.
pub fn load_config_file() -> TrackerConfigFile {
    let Some(path) = config_file_path().filter(|p| p.exists()) else {
        return TrackerConfigFile::default();
    };

    read_config(&path).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "ignoring config file, using defaults");
        TrackerConfigFile::default()
    })
}

/// Read and parse one config file
///
/// # Errors
///
/// Returns error if the file can't be read or the TOML is malformed
pub fn read_config(path: &Path) -> crate::Result<TrackerConfigFile> {
    let config = parse_config(&std::fs::read_to_string(path)?)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Parse config file contents
///
/// # Errors
///
/// Returns error if the TOML is malformed
pub fn parse_config(content: &str) -> crate::Result<TrackerConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Return the config file path: `~/.config/voice-tracker/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("voice-tracker").join("config.toml"))
}
