use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use voice_tracker::config::{CameraKind, SpeakerKind};
use voice_tracker::vision::{
    CameraSource, ColorDetector, DirectoryCamera, ImageFileWriter, LogDisplay, SyntheticCamera,
};
use voice_tracker::voice::{ScriptListener, SpeechListener, StdinListener, create_speaker};
use voice_tracker::{
    Config, ListenLoop, Orchestrator, SharedControlState, TargetId, VisionLoop,
};

/// Delay between scripted utterances, so the camera has time to react
const SCRIPT_PACE: Duration = Duration::from_secs(1);

/// Tracker - find fruit on camera by voice command
#[derive(Parser)]
#[command(name = "tracker", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// Frame source: "synthetic" or a directory of images
    #[arg(long)]
    camera: Option<String>,

    /// Replay utterances from a file instead of reading stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Speech output: auto, console, or espeak
    #[arg(long)]
    speaker: Option<String>,

    /// Where still captures are written
    #[arg(long)]
    capture_path: Option<PathBuf>,

    /// Seconds to wait for each utterance
    #[arg(long)]
    listen_timeout: Option<f64>,

    /// Target to arm at startup (orange, lemon, tomato, green_apple)
    #[arg(long)]
    target: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,voice_tracker=info",
        1 => "info,voice_tracker=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    tracing::debug!(?config, "loaded configuration");

    // Speech backends first: a missing model is fatal before any loop starts
    let listener: Box<dyn SpeechListener> = match &config.speech.script {
        Some(path) => Box::new(ScriptListener::from_file(path)?.with_pace(SCRIPT_PACE)),
        None => Box::new(StdinListener::new()?),
    };
    let speaker = create_speaker(&config.speech)?;

    let camera: Box<dyn CameraSource> = match &config.vision.camera {
        CameraKind::Synthetic => Box::new(SyntheticCamera::new(
            config.vision.frame_width,
            config.vision.frame_height,
        )),
        CameraKind::Directory(dir) => Box::new(DirectoryCamera::new(dir)),
    };

    let control = Arc::new(SharedControlState::new());
    if let Some(target) = config.initial_target {
        tracing::info!(%target, "arming initial target");
        control.set_target(Some(target));
        control.set_camera_enabled(true);
    }

    let vision = VisionLoop::new(
        camera,
        Box::new(ColorDetector::for_vision(&config.vision)),
        Box::new(LogDisplay::new()),
        Box::new(ImageFileWriter::new()),
        &config.vision,
    );
    let listen = ListenLoop::new(
        listener,
        speaker,
        Arc::clone(&control),
        config.speech.listen_timeout,
    );

    tracing::info!(
        fps = config.vision.fps,
        camera = ?config.vision.camera,
        capture = %config.vision.capture_path.display(),
        "tracker ready"
    );

    let report = Orchestrator::new(control, vision, listen).run().await?;
    tracing::info!(
        sessions = report.sessions_started,
        frames = report.frames_processed,
        quit = report.listen.quit_requested,
        "tracker stopped"
    );

    Ok(())
}

/// Layer CLI flags over env and config file
fn load_config(cli: &Cli) -> voice_tracker::Result<Config> {
    let mut config = Config::load()?;

    if let Some(fps) = cli.fps {
        config.vision.fps = fps;
    }
    if let Some(camera) = &cli.camera {
        config.vision.camera = camera.parse::<CameraKind>()?;
    }
    if let Some(path) = &cli.capture_path {
        config.vision.capture_path.clone_from(path);
    }
    if let Some(script) = &cli.script {
        config.speech.script = Some(script.clone());
    }
    if let Some(speaker) = &cli.speaker {
        config.speech.speaker = speaker.parse::<SpeakerKind>()?;
    }
    if let Some(secs) = cli.listen_timeout {
        config.speech.listen_timeout = voice_tracker::config::listen_timeout(secs)?;
    }
    if let Some(target) = &cli.target {
        config.initial_target = Some(target.parse::<TargetId>()?);
    }

    config.validate()?;
    Ok(config)
}
