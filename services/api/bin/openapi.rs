//! Dumps the voicebot API's OpenAPI document (scene, voice, command and health
//! routes) so browser renderers can generate a client without running the server.
//!
//! Usage: `openapi [OUTPUT]`, defaulting to `openapi.json`.

use anyhow::Context;
use utoipa::OpenApi;
use voicebot_api::router::ApiDoc;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> anyhow::Result<()> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let document = ApiDoc::openapi()
        .to_pretty_json()
        .context("Failed to serialize the OpenAPI document")?;
    std::fs::write(&output, document).with_context(|| format!("Failed to write {}", output))?;

    println!("Wrote OpenAPI document to {}", output);
    Ok(())
}
