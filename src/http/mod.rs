//! REST service for voice detection, compiled with the `http` feature.
//!
//! This module exposes the detector over an Axum router: a service
//! description at `/`, a health check at `/health` and the
//! API-key protected `POST /api/voice-detection` endpoint.

mod routes;

pub use routes::{
    build_router, run_http_server, HttpServerError, HttpState, VoiceDetectionRequest,
    VoiceDetectionResponse, SUPPORTED_LANGUAGES,
};

use std::net::SocketAddr;

use anyhow::Context;
use log::info;

use crate::config::AppConfig;

/// Build a multi-threaded runtime and serve until Ctrl-C
///
/// # Arguments
/// * `config` - Detector calibration and HTTP settings
/// * `addr` - Listen address (overrides `config.http.host`/`port`)
pub fn serve_blocking(config: &AppConfig, addr: SocketAddr) -> anyhow::Result<()> {
    let state = HttpState::new(config).context("building detector for HTTP service")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime for HTTP service")?;

    let preview = config
        .http
        .api_keys
        .first()
        .map(|key| key.chars().take(4).collect::<String>())
        .unwrap_or_default();
    info!(
        "[Http] Voice detection service binding {} ({} API key(s), first prefix {}***)",
        addr,
        config.http.api_keys.len(),
        preview
    );

    runtime.block_on(run_http_server(state, addr))
}
