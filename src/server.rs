//! Local web server for the rendered report
//!
//! The page and summaries are computed once before the server starts; every
//! request gets the same precomputed response.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::report::ReportArtifacts;

#[derive(Clone)]
struct AppState {
    html: Arc<str>,
    summaries: Arc<str>,
}

/// Build the router serving `/`, `/report.json` and `/healthz`
pub fn router(artifacts: &ReportArtifacts) -> Result<Router> {
    let summaries = serde_json::to_string(&artifacts.summaries)
        .context("Failed to serialize summaries")?;

    let state = AppState {
        html: Arc::from(artifacts.html.as_str()),
        summaries: Arc::from(summaries.as_str()),
    };

    Ok(Router::new()
        .route("/", get(index))
        .route("/report.json", get(report_json))
        .route("/healthz", get(healthz))
        .with_state(state))
}

/// Serve the report until the process is stopped
pub async fn serve(artifacts: &ReportArtifacts, addr: &str) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("Invalid server address: {}", addr))?;
    let app = router(artifacts)?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(%addr, "serving report");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

async fn index(State(st): State<AppState>) -> Html<String> {
    Html(st.html.to_string())
}

async fn report_json(State(st): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        st.summaries.to_string(),
    )
}

async fn healthz() -> impl IntoResponse {
    Json(json!({"ok": true}))
}
