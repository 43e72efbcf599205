//! Terminal front end: press Enter to record a voice command, watch the robot move.

mod capture;
mod renderer;
mod session;

use anyhow::bail;
use clap::{Parser, ValueEnum};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::{io::BufReader, sync::RwLock};
use tracing::{Level, info, warn};
use voicebot_core::{
    BrightnessPolicy, DispatchPolicy, Dispatcher, SceneState,
    collaborator::{AudioCapture, SceneRenderer},
    dispatcher::DEFAULT_MOVE_STEP,
    gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiConfig, GeminiInterpreter},
    pipeline::{SharedScene, VoicePipeline},
};

use crate::{capture::FileCapture, renderer::TextRenderer};

const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Brightness {
    /// Light commands only toggle between the on and off intensities.
    Ignore,
    /// A brightness percentage scales between the off and on intensities.
    Scale,
}

impl From<Brightness> for BrightnessPolicy {
    fn from(value: Brightness) -> Self {
        match value {
            Brightness::Ignore => BrightnessPolicy::Ignore,
            Brightness::Scale => BrightnessPolicy::Scale,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Seconds to wait for an interpretation. 0 waits forever.
    #[arg(long, env = "INTERPRET_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Distance covered by one move command.
    #[arg(long, env = "MOVE_STEP", default_value_t = DEFAULT_MOVE_STEP)]
    move_step: f32,

    #[arg(long, env = "BRIGHTNESS_POLICY", value_enum, default_value_t = Brightness::Ignore)]
    brightness: Brightness,

    /// Use a pre-recorded clip instead of the microphone.
    #[arg(long)]
    audio_file: Option<PathBuf>,

    /// Scene redraws per second.
    #[arg(long, default_value_t = 4)]
    fps: u32,

    #[arg(long, env = "RUST_LOG", default_value_t = Level::INFO)]
    log_level: Level,
}

#[cfg(feature = "microphone")]
fn microphone_capture() -> anyhow::Result<Box<dyn AudioCapture>> {
    Ok(Box::new(capture::MicrophoneCapture::new()))
}

#[cfg(not(feature = "microphone"))]
fn microphone_capture() -> anyhow::Result<Box<dyn AudioCapture>> {
    bail!("built without the `microphone` feature; pass --audio-file to replay a clip")
}

fn select_capture(audio_file: Option<PathBuf>) -> anyhow::Result<Box<dyn AudioCapture>> {
    match audio_file {
        Some(path) => Ok(Box::new(FileCapture::new(path))),
        None => microphone_capture(),
    }
}

/// Redraws the scene on a fixed cadence until the process exits.
async fn render_loop(scene: SharedScene, fps: u32) {
    let mut renderer = TextRenderer::new(std::io::stdout());
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / fps.max(1) as f64));
    loop {
        ticker.tick().await;
        let state = scene.read().await;
        if let Err(e) = renderer.render(&state) {
            warn!(error = %e, "Render failed");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Logs go to stderr so they do not interleave with the scene drawing.
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    if args.api_key.trim().is_empty() || args.api_key == API_KEY_PLACEHOLDER {
        bail!("Please set GEMINI_API_KEY to a real Gemini API key");
    }

    let mut capture = select_capture(args.audio_file.clone())?;

    let scene: SharedScene = Arc::new(RwLock::new(SceneState::default()));
    let interpreter = Arc::new(GeminiInterpreter::new(GeminiConfig {
        api_key: args.api_key.clone(),
        model: args.model.clone(),
        base_url: args.base_url.clone(),
    }));
    let policy = DispatchPolicy {
        move_step: args.move_step,
        brightness: args.brightness.into(),
        ..DispatchPolicy::default()
    };
    let timeout = (args.timeout_secs > 0).then(|| Duration::from_secs(args.timeout_secs));
    let pipeline =
        VoicePipeline::new(interpreter, scene.clone(), Dispatcher::new(policy)).with_timeout(timeout);

    info!(model = %args.model, timeout = ?timeout, "3D scene loaded.");
    let render_task = tokio::spawn(render_loop(scene, args.fps));

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    tokio::select! {
        result = session::run_session(stdin, capture.as_mut(), &pipeline, &mut stdout) => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted."),
    }

    render_task.abort();
    Ok(())
}
