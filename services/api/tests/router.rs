use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceExt;
use voicebot_api::{router::create_router, state::AppState};
use voicebot_core::{
    Dispatcher, FunctionCall, InterpretationResult, SceneState,
    collaborator::{CollaboratorError, ScriptedInterpreter},
    pipeline::VoicePipeline,
};

fn app_with(responses: Vec<Result<InterpretationResult, CollaboratorError>>) -> Router {
    let scene = Arc::new(RwLock::new(SceneState::default()));
    let pipeline = VoicePipeline::new(
        Arc::new(ScriptedInterpreter::new(responses)),
        scene,
        Dispatcher::default(),
    );
    create_router(Arc::new(AppState::new(pipeline)))
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn voice_request(body: &'static [u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/voice")
        .header(CONTENT_TYPE, "audio/webm")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = app_with(vec![]);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "ok", "busy": false}));
}

#[tokio::test]
async fn test_get_scene_defaults() {
    let app = app_with(vec![]);

    let response = app
        .oneshot(Request::builder().uri("/scene").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["actor_position"], json!([0.0, 0.0, 0.0]));
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_voice_light_on() {
    let app = app_with(vec![Ok(InterpretationResult::FunctionCall(
        FunctionCall::new("controlLight", json!({"state": "on"})),
    ))]);

    let response = app.oneshot(voice_request(b"fake-webm")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["status"].as_str().unwrap().contains("ON"));
    assert_eq!(body["outcome"]["kind"], "success");
    assert!(
        body["transcript"]
            .as_str()
            .unwrap()
            .starts_with("Gemini Action: controlLight")
    );
    let intensity = body["scene"]["light_intensity"].as_f64().unwrap();
    assert!((intensity - 0.8).abs() < 1e-6);
}

#[tokio::test]
async fn test_voice_text_response_is_informational() {
    let app = app_with(vec![Ok(InterpretationResult::Text(
        "Sorry, I didn't catch that.".into(),
    ))]);

    let response = app.oneshot(voice_request(b"fake-webm")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["outcome"]["kind"], "informational");
    assert_eq!(body["scene"]["actor_position"], json!([0.0, 0.0, 0.0]));
}

#[tokio::test]
async fn test_voice_service_error() {
    let app = app_with(vec![Err(CollaboratorError::Service("quota".into()))]);

    let response = app.oneshot(voice_request(b"fake-webm")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = json_body(response).await;
    assert_eq!(body["message"], "Status: Error interpreting command. See logs.");
}

#[tokio::test]
async fn test_voice_empty_body() {
    let app = app_with(vec![]);

    let response = app.oneshot(voice_request(b"")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_direct_commands_mutate_scene() {
    let app = app_with(vec![]);

    let request = Request::builder()
        .method("POST")
        .uri("/commands")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"name": "moveRobot", "args": {"direction": "left"}}).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "Status: moved left");
    assert_eq!(body["scene"]["actor_position"], json!([-0.5, 0.0, 0.0]));

    let response = app
        .oneshot(Request::builder().uri("/scene").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["actor_position"], json!([-0.5, 0.0, 0.0]));
}

#[tokio::test]
async fn test_direct_unknown_function() {
    let app = app_with(vec![]);

    let request = Request::builder()
        .method("POST")
        .uri("/commands")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"name": "doSomethingElse"}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["outcome"]["kind"], "informational");
    assert_eq!(body["outcome"]["detail"], "unknown function doSomethingElse");
}
