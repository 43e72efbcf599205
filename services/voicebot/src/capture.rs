//! Audio capture sources for the terminal front end.

use std::path::{Path, PathBuf};
use tracing::info;
use voicebot_core::collaborator::{AudioCapture, CaptureHandle, CollaboratorError, EncodedAudio};

/// Guesses an audio MIME type from a file extension.
fn mime_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("webm") => "audio/webm",
        Some("mp3") => "audio/mp3",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("aac") => "audio/aac",
        _ => "audio/wav",
    }
}

/// Replays a pre-recorded clip from disk for every recording.
///
/// The file is read when the recording stops, so it can be replaced between takes.
pub struct FileCapture {
    path: PathBuf,
    next_id: u64,
    active: Option<CaptureHandle>,
}

impl FileCapture {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            next_id: 0,
            active: None,
        }
    }
}

impl AudioCapture for FileCapture {
    fn start_capture(&mut self) -> Result<CaptureHandle, CollaboratorError> {
        if !self.path.is_file() {
            return Err(CollaboratorError::Capture(format!(
                "{} is not a readable file",
                self.path.display()
            )));
        }
        self.next_id += 1;
        let handle = CaptureHandle(self.next_id);
        self.active = Some(handle);
        info!(path = %self.path.display(), "Recording from file");
        Ok(handle)
    }

    fn stop_capture(&mut self, handle: CaptureHandle) -> Result<EncodedAudio, CollaboratorError> {
        if self.active != Some(handle) {
            return Err(CollaboratorError::Capture("no such recording".into()));
        }
        self.active = None;
        let data = std::fs::read(&self.path).map_err(|e| {
            CollaboratorError::Capture(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        Ok(EncodedAudio::new(mime_type_for(&self.path), data))
    }
}

#[cfg(feature = "microphone")]
pub use microphone::MicrophoneCapture;

#[cfg(feature = "microphone")]
mod microphone {
    use cpal::{
        BuildStreamError, SampleFormat, Stream,
        traits::{DeviceTrait, HostTrait, StreamTrait},
    };
    use std::sync::{Arc, Mutex};
    use tracing::{error, info};
    use voicebot_core::{
        audio_utils,
        collaborator::{AudioCapture, CaptureHandle, CollaboratorError, EncodedAudio},
    };

    struct ActiveRecording {
        handle: CaptureHandle,
        stream: Stream,
        samples: Arc<Mutex<Vec<f32>>>,
        sample_rate: u32,
        channels: u16,
    }

    /// Records from the default input device, encoding each take as 16 kHz mono WAV.
    #[derive(Default)]
    pub struct MicrophoneCapture {
        next_id: u64,
        active: Option<ActiveRecording>,
    }

    impl MicrophoneCapture {
        pub fn new() -> Self {
            Self::default()
        }
    }

    fn map_build_error(err: BuildStreamError) -> CollaboratorError {
        match err {
            BuildStreamError::DeviceNotAvailable => CollaboratorError::PermissionDenied,
            other => CollaboratorError::Capture(other.to_string()),
        }
    }

    impl AudioCapture for MicrophoneCapture {
        fn start_capture(&mut self) -> Result<CaptureHandle, CollaboratorError> {
            if self.active.is_some() {
                return Err(CollaboratorError::Capture("already recording".into()));
            }

            let host = cpal::default_host();
            let device = host
                .default_input_device()
                .ok_or(CollaboratorError::PermissionDenied)?;
            let supported = device
                .default_input_config()
                .map_err(|e| CollaboratorError::Capture(e.to_string()))?;
            let sample_format = supported.sample_format();
            let config = supported.config();

            let samples = Arc::new(Mutex::new(Vec::new()));
            let sink = samples.clone();
            let err_fn = |e: cpal::StreamError| error!("Microphone stream error: {}", e);

            let stream = match sample_format {
                SampleFormat::F32 => device.build_input_stream(
                    &config,
                    move |data: &[f32], _| {
                        if let Ok(mut buf) = sink.lock() {
                            buf.extend_from_slice(data);
                        }
                    },
                    err_fn,
                    None,
                ),
                SampleFormat::I16 => device.build_input_stream(
                    &config,
                    move |data: &[i16], _| {
                        if let Ok(mut buf) = sink.lock() {
                            buf.extend(audio_utils::convert_i16_to_f32(data));
                        }
                    },
                    err_fn,
                    None,
                ),
                other => {
                    return Err(CollaboratorError::Capture(format!(
                        "unsupported sample format {}",
                        other
                    )));
                }
            }
            .map_err(map_build_error)?;
            stream
                .play()
                .map_err(|e| CollaboratorError::Capture(e.to_string()))?;

            self.next_id += 1;
            let handle = CaptureHandle(self.next_id);
            info!(
                sample_rate = config.sample_rate.0,
                channels = config.channels,
                "Microphone recording started"
            );
            self.active = Some(ActiveRecording {
                handle,
                stream,
                samples,
                sample_rate: config.sample_rate.0,
                channels: config.channels,
            });
            Ok(handle)
        }

        fn stop_capture(
            &mut self,
            handle: CaptureHandle,
        ) -> Result<EncodedAudio, CollaboratorError> {
            let recording = match self.active.take() {
                Some(recording) if recording.handle == handle => recording,
                other => {
                    self.active = other;
                    return Err(CollaboratorError::Capture("no such recording".into()));
                }
            };
            drop(recording.stream);

            let interleaved = match recording.samples.lock() {
                Ok(buf) => buf.clone(),
                Err(poisoned) => poisoned.into_inner().clone(),
            };
            let mono = audio_utils::downmix_to_mono(&interleaved, recording.channels);
            info!(samples = mono.len(), "Microphone recording stopped");

            let wav = audio_utils::encode_voice_clip(&mono, recording.sample_rate)
                .map_err(|e| CollaboratorError::Capture(e.to_string()))?;
            Ok(EncodedAudio::new(audio_utils::WAV_MIME_TYPE, wav))
        }
    }
}
