//! Gemini Interpretation Client
//!
//! Sends a recorded voice clip to the Gemini `generateContent` endpoint along
//! with the function declarations, and reports back either the function call
//! the model chose or the text it answered with instead.

use crate::{
    adapter::{FunctionCall, InterpretationResult},
    collaborator::{CollaboratorError, EncodedAudio, Interpreter},
    schema::FunctionDeclaration,
};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Public Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Instruction sent ahead of every clip.
pub const INSTRUCTION_PROMPT: &str = "You are an AI assistant for a home care robot. Listen to the voice command and use the provided functions (moveRobot, controlLight, findItem) to execute the command. If the command is unclear or cannot be mapped to a function, indicate that by responding with text and not a function call.";

const MAX_OUTPUT_TOKENS: u32 = 150;
const ERROR_BODY_EXCERPT: usize = 300;

// --- Local Gemini REST Types ---
pub(crate) mod gemini_types {
    use crate::schema::FunctionDeclaration;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub(crate) struct GenerateContentRequest<'a> {
        pub contents: Vec<Content>,
        pub tools: Vec<Tool<'a>>,
        pub tool_config: ToolConfig,
        pub generation_config: GenerationConfig,
        pub safety_settings: Vec<SafetySetting>,
    }
    #[derive(Serialize, Debug)]
    pub(crate) struct Content {
        pub role: String,
        pub parts: Vec<Part>,
    }
    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub(crate) enum Part {
        Text(String),
        InlineData(Blob),
    }
    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub(crate) struct Blob {
        pub mime_type: String,
        pub data: String,
    }
    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub(crate) struct Tool<'a> {
        pub function_declarations: &'a [FunctionDeclaration],
    }
    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub(crate) struct ToolConfig {
        pub function_calling_config: FunctionCallingConfig,
    }
    #[derive(Serialize, Debug)]
    pub(crate) struct FunctionCallingConfig {
        pub mode: String,
    }
    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub(crate) struct GenerationConfig {
        pub max_output_tokens: u32,
    }
    #[derive(Serialize, Debug)]
    pub(crate) struct SafetySetting {
        pub category: String,
        pub threshold: String,
    }

    #[derive(Deserialize, Debug, Default)]
    pub(crate) struct GenerateContentResponse {
        #[serde(default)]
        pub candidates: Vec<Candidate>,
    }
    #[derive(Deserialize, Debug)]
    pub(crate) struct Candidate {
        pub content: Option<CandidateContent>,
    }
    #[derive(Deserialize, Debug)]
    pub(crate) struct CandidateContent {
        #[serde(default)]
        pub parts: Vec<ResponsePart>,
    }
    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub(crate) struct ResponsePart {
        pub text: Option<String>,
        pub function_call: Option<ResponseFunctionCall>,
    }
    #[derive(Deserialize, Debug)]
    pub(crate) struct ResponseFunctionCall {
        pub name: String,
        #[serde(default)]
        pub args: serde_json::Value,
    }
}

use gemini_types::*;

/// Connection settings for [`GeminiInterpreter`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// An [`Interpreter`] backed by the Gemini REST API.
pub struct GeminiInterpreter {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiInterpreter {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl Interpreter for GeminiInterpreter {
    async fn interpret(
        &self,
        audio: &EncodedAudio,
        schema: &[FunctionDeclaration],
    ) -> Result<InterpretationResult, CollaboratorError> {
        let request = build_request(audio, schema);
        info!(
            model = %self.config.model,
            audio_bytes = audio.data.len(),
            mime_type = %audio.mime_type,
            "Sending voice command to Gemini for function call"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CollaboratorError::Service(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(ERROR_BODY_EXCERPT).collect();
            warn!(%status, body = %excerpt, "Gemini returned an error status");
            return Err(CollaboratorError::Service(format!("{}: {}", status, excerpt)));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Service(format!("invalid response body: {}", e)))?;
        debug!(?body, "Gemini response");
        parse_response(body)
    }
}

pub(crate) fn build_request<'a>(
    audio: &EncodedAudio,
    schema: &'a [FunctionDeclaration],
) -> GenerateContentRequest<'a> {
    let safety_settings = [
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category: category.to_string(),
        threshold: "BLOCK_NONE".to_string(),
    })
    .collect();

    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![
                Part::Text(INSTRUCTION_PROMPT.to_string()),
                Part::InlineData(Blob {
                    mime_type: audio.mime_type.clone(),
                    data: audio.to_base64(),
                }),
            ],
        }],
        tools: vec![Tool {
            function_declarations: schema,
        }],
        tool_config: ToolConfig {
            function_calling_config: FunctionCallingConfig {
                mode: "AUTO".to_string(),
            },
        },
        generation_config: GenerationConfig {
            max_output_tokens: MAX_OUTPUT_TOKENS,
        },
        safety_settings,
    }
}

/// Picks the first function call of the first candidate, falling back to its text.
pub(crate) fn parse_response(
    response: GenerateContentResponse,
) -> Result<InterpretationResult, CollaboratorError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| CollaboratorError::Service("response contained no candidates".into()))?;
    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

    let mut text = String::new();
    for part in parts {
        if let Some(call) = part.function_call {
            return Ok(InterpretationResult::FunctionCall(FunctionCall::new(
                call.name, call.args,
            )));
        }
        if let Some(fragment) = part.text {
            text.push_str(&fragment);
        }
    }
    Ok(InterpretationResult::Text(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::function_declarations;
    use serde_json::json;

    fn response(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_shape() {
        let schema = function_declarations();
        let audio = EncodedAudio::new("audio/webm", vec![1, 2, 3]);
        let value = serde_json::to_value(build_request(&audio, &schema)).unwrap();

        let parts = &value["contents"][0]["parts"];
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(parts[0]["text"], INSTRUCTION_PROMPT);
        assert_eq!(parts[1]["inlineData"]["mimeType"], "audio/webm");
        assert_eq!(parts[1]["inlineData"]["data"], "AQID");
        assert_eq!(
            value["tools"][0]["functionDeclarations"][2]["name"],
            "findItem"
        );
        assert_eq!(value["toolConfig"]["functionCallingConfig"]["mode"], "AUTO");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 150);
        assert_eq!(value["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(value["safetySettings"][0]["threshold"], "BLOCK_NONE");
    }

    #[test]
    fn test_parse_function_call() {
        let parsed = parse_response(response(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Sure."},
                        {"functionCall": {"name": "controlLight", "args": {"state": "on"}}}
                    ]
                }
            }]
        })))
        .unwrap();

        assert_eq!(
            parsed,
            InterpretationResult::FunctionCall(FunctionCall::new(
                "controlLight",
                json!({"state": "on"})
            ))
        );
    }

    #[test]
    fn test_parse_text_response() {
        let parsed = parse_response(response(json!({
            "candidates": [{
                "content": {"parts": [{"text": "I'm not sure "}, {"text": "what you mean."}]}
            }]
        })))
        .unwrap();
        assert_eq!(
            parsed,
            InterpretationResult::Text("I'm not sure what you mean.".into())
        );
    }

    #[test]
    fn test_parse_empty_candidates() {
        let err = parse_response(response(json!({}))).unwrap_err();
        assert!(matches!(err, CollaboratorError::Service(_)));

        let parsed = parse_response(response(json!({"candidates": [{}]}))).unwrap();
        assert_eq!(parsed, InterpretationResult::Text(String::new()));
    }

    #[test]
    fn test_endpoint() {
        let mut config = GeminiConfig::new("key");
        config.base_url = "http://localhost:8080/v1beta/".to_string();
        let interpreter = GeminiInterpreter::new(config);
        assert_eq!(
            interpreter.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
