use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::analysis::{DetectionResult, VoiceDetector};
use crate::audio::decode_wav_bytes;
use crate::config::{AppConfig, DetectorConfig};
use crate::error::{log_audio_error, CalibrationError, ErrorCode};

/// Languages accepted in detection requests
pub const SUPPORTED_LANGUAGES: [&str; 5] = ["Tamil", "English", "Hindi", "Malayalam", "Telugu"];

const SERVICE_NAME: &str = "AI Voice Detection API";
const SERVICE_VERSION: &str = "1.0.0";
const API_KEY_HEADER: &str = "x-api-key";

/// Base64 payloads shorter than this are rejected before decoding
const MIN_PAYLOAD_CHARS: usize = 100;

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    detector: Arc<VoiceDetector>,
    detector_config: Arc<DetectorConfig>,
    api_keys: Arc<Vec<String>>,
}

impl HttpState {
    pub fn new(config: &AppConfig) -> Result<Self, CalibrationError> {
        Ok(Self {
            detector: Arc::new(VoiceDetector::new(config)?),
            detector_config: Arc::new(config.detector.clone()),
            api_keys: Arc::new(config.http.api_keys.clone()),
        })
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), HttpServerError> {
        let provided = headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());
        match provided {
            Some(key) if self.api_keys.iter().any(|valid| valid == key) => Ok(()),
            _ => Err(HttpServerError::Unauthorized),
        }
    }
}

/// HTTP error variants mapped to JSON responses.
#[derive(Debug)]
pub enum HttpServerError {
    Unauthorized,
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid API key".to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => {
                log::error!("[Http] Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(serde_json::json!({ "status": "error", "message": message })),
        )
            .into_response()
    }
}

/// Detection request body.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceDetectionRequest {
    pub language: String,
    #[serde(default = "default_audio_format")]
    pub audio_format: String,
    pub audio_base64: String,
}

fn default_audio_format() -> String {
    "wav".to_string()
}

/// Detection response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceDetectionResponse {
    pub status: String,
    pub language: String,
    #[serde(flatten)]
    pub result: DetectionResult,
}

/// Service description payload.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub supported_languages: [&'static str; 5],
}

/// Build the Axum router with all handlers.
pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/api/voice-detection", post(detect_voice))
        .layer(cors_layer())
        .with_state(state)
}

/// Browsers may call the API from any origin
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Run the HTTP server loop until Ctrl-C.
pub async fn run_http_server(state: HttpState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("binding voice detection listener")?;
    let router = build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving voice detection router")?;
    log::info!("[Http] Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("[Http] Failed to listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }
}

pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        status: "healthy",
        service: SERVICE_NAME,
        version: SERVICE_VERSION,
        supported_languages: SUPPORTED_LANGUAGES,
    })
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Strip an optional `data:...;base64,` prefix and decode
fn decode_payload(payload: &str) -> Result<Vec<u8>, HttpServerError> {
    let encoded = payload
        .split_once(',')
        .map(|(_, data)| data)
        .unwrap_or(payload)
        .trim();
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|err| HttpServerError::BadRequest(format!("Failed to decode audio: {}", err)))
}

fn validate_request(request: &VoiceDetectionRequest) -> Result<(), HttpServerError> {
    if !SUPPORTED_LANGUAGES.contains(&request.language.as_str()) {
        return Err(HttpServerError::BadRequest(format!(
            "Unsupported language. Must be one of: {}",
            SUPPORTED_LANGUAGES.join(", ")
        )));
    }
    if !request.audio_format.eq_ignore_ascii_case("wav") {
        return Err(HttpServerError::BadRequest(format!(
            "Unsupported audio format '{}'. Only wav is supported.",
            request.audio_format
        )));
    }
    if request.audio_base64.len() < MIN_PAYLOAD_CHARS {
        return Err(HttpServerError::BadRequest(
            "Invalid or empty audio data".to_string(),
        ));
    }
    Ok(())
}

pub async fn detect_voice(
    State(state): State<HttpState>,
    headers: HeaderMap,
    payload: Result<Json<VoiceDetectionRequest>, JsonRejection>,
) -> Result<Json<VoiceDetectionResponse>, HttpServerError> {
    state.authorize(&headers)?;

    let Json(request) =
        payload.map_err(|rejection| HttpServerError::BadRequest(rejection.body_text()))?;
    validate_request(&request)?;
    let bytes = decode_payload(&request.audio_base64)?;

    let detector = Arc::clone(&state.detector);
    let detector_config = Arc::clone(&state.detector_config);
    let outcome = tokio::task::spawn_blocking(move || {
        decode_wav_bytes(&bytes, &detector_config).map(|waveform| detector.detect(&waveform))
    })
    .await
    .map_err(|err| HttpServerError::Internal(format!("detection task failed: {}", err)))?;

    let result = outcome.map_err(|err| {
        log_audio_error(&err, "detect_voice");
        HttpServerError::BadRequest(err.message())
    })?;

    log::info!(
        "[Http] {} request: {} ({:.2})",
        request.language,
        result.classification,
        result.confidence
    );

    Ok(Json(VoiceDetectionResponse {
        status: "success".to_string(),
        language: request.language,
        result,
    }))
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
