//! Interactive record/process loop.
//!
//! Each line of input toggles recording: the first starts a take, the next
//! stops it and sends it through the pipeline. The loop does not read further
//! input until the pipeline has answered, so only one command is ever in flight.

use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};
use voicebot_core::{
    collaborator::{AudioCapture, CaptureHandle},
    pipeline::VoicePipeline,
};

pub const READY_STATUS: &str =
    "Status: Ready for voice commands. Press Enter to start recording, 'q' to quit.";

pub async fn run_session<R, W>(
    input: R,
    capture: &mut dyn AudioCapture,
    pipeline: &VoicePipeline,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut recording: Option<CaptureHandle> = None;
    writeln!(out, "{}", READY_STATUS)?;

    while let Some(line) = lines.next_line().await? {
        if matches!(line.trim(), "q" | "quit" | "exit") {
            break;
        }

        match recording.take() {
            None => {
                writeln!(out, "Status: Listening...")?;
                match capture.start_capture() {
                    Ok(handle) => {
                        recording = Some(handle);
                        writeln!(
                            out,
                            "Status: Recording... Press Enter again to stop and process."
                        )?;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to start recording");
                        writeln!(out, "{}", e.status_line())?;
                    }
                }
            }
            Some(handle) => {
                writeln!(out, "Status: Processing voice command...")?;
                let audio = match capture.stop_capture(handle) {
                    Ok(audio) => audio,
                    Err(e) => {
                        warn!(error = %e, "Failed to stop recording");
                        writeln!(out, "{}", e.status_line())?;
                        continue;
                    }
                };

                writeln!(out, "Status: Sending to Gemini for function call...")?;
                match pipeline.process(audio).await {
                    Ok(report) => {
                        if let Some(transcript) = &report.transcript {
                            writeln!(out, "{}", transcript)?;
                        }
                        writeln!(out, "{}", report.status)?;
                    }
                    Err(e) => {
                        warn!(error = %e, "Voice command failed");
                        writeln!(out, "{}", e.status_line())?;
                    }
                }
            }
        }
        out.flush()?;
    }

    if let Some(handle) = recording {
        // Release the device; the take is discarded.
        let _ = capture.stop_capture(handle);
    }
    info!("Session ended.");
    Ok(())
}
