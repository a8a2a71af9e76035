use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderValue, StatusCode},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::analyzer::Analyzer;
use crate::chart::generate_pie_chart;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::llm_gateway::AnalysisService;
use crate::poller::{wait_for_file_active, PollPolicy};
use crate::result_parser::{parse_analysis_result, SentimentTally};
use crate::{ui, uploader};

const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn AnalysisService>,
    pub analyzer: Arc<Analyzer>,
    pub poll: PollPolicy,
    /// Cancelled on shutdown so pending readiness waits stop early.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(service: Arc<dyn AnalysisService>, model: &str, poll: PollPolicy) -> Self {
        Self {
            service,
            analyzer: Arc::new(Analyzer::new(model)),
            poll,
            shutdown: CancellationToken::new(),
        }
    }
}

/// Outcome of one analysis. `raw_text` is present whenever the model
/// answered, even if the reply could not be turned into a chart.
#[derive(Serialize, Debug)]
pub struct AnalyzeResponse {
    pub request_id: String,
    pub file_name: String,
    pub raw_text: Option<String>,
    pub tally: Option<SentimentTally>,
    pub chart_svg: Option<String>,
    pub error: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl AnalyzeResponse {
    fn new(request_id: String, file_name: &str) -> Self {
        Self {
            request_id,
            file_name: file_name.to_string(),
            raw_text: None,
            tally: None,
            chart_svg: None,
            error: None,
            completed_at: Utc::now(),
        }
    }

    fn fail(&mut self, err: AppError) {
        tracing::error!("analysis failed: {}", err);
        self.error = Some(err.to_string());
    }
}

/// Keeps only characters that are safe inside a file name.
fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "upload.csv".to_string()
    } else {
        cleaned
    }
}

/// Writes the uploaded bytes to a scratch file that is deleted when dropped.
fn persist_upload(file_name: &str, bytes: &[u8]) -> std::io::Result<NamedTempFile> {
    let mut temp = tempfile::Builder::new()
        .prefix("temp_")
        .suffix(&format!("_{}", sanitize_file_name(file_name)))
        .tempfile()?;
    temp.write_all(bytes)?;
    temp.flush()?;
    Ok(temp)
}

/// Upload → wait for readiness → ask the model.
async fn analyze_file(state: &AppState, path: &Path, file_name: &str) -> AppResult<String> {
    let uploaded = uploader::upload_to_service(state.service.as_ref(), path, file_name, None).await?;
    let active = wait_for_file_active(state.service.as_ref(), uploaded, &state.poll, &state.shutdown).await?;
    state.analyzer.analyze(state.service.as_ref(), &active).await
}

fn render(raw_text: &str) -> AppResult<(SentimentTally, String)> {
    let tally = parse_analysis_result(raw_text)?;
    let chart = generate_pie_chart(&tally)?;
    tracing::debug!(slices = ?chart.labels(), "rendered {} slices", chart.slices().len());
    Ok((tally, chart.to_svg()))
}

/// Runs the whole pipeline for one uploaded file. Never fails: every error is
/// reported in the response. The scratch copy is gone when this returns.
pub async fn run_analysis(state: &AppState, file_name: &str, bytes: &[u8]) -> AnalyzeResponse {
    let request_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("analysis", request_id = %request_id, file = %file_name);

    async move {
        let mut response = AnalyzeResponse::new(request_id, file_name);

        let temp = match persist_upload(file_name, bytes) {
            Ok(t) => t,
            Err(e) => {
                response.fail(AppError::Io(e));
                return response;
            }
        };

        match analyze_file(state, temp.path(), file_name).await {
            Ok(text) => {
                tracing::info!("sentiment analysis completed");
                match render(&text) {
                    Ok((tally, svg)) => {
                        response.tally = Some(tally);
                        response.chart_svg = Some(svg);
                    }
                    Err(e) => response.fail(e),
                }
                response.raw_text = Some(text);
            }
            Err(e) => response.fail(e),
        }

        let temp_path = temp.path().to_path_buf();
        if let Err(e) = temp.close() {
            tracing::warn!(path = %temp_path.display(), "failed to remove temporary upload: {}", e);
        }

        response.completed_at = Utc::now();
        response
    }
    .instrument(span)
    .await
}

async fn index_handler() -> Html<&'static str> {
    Html(ui::INDEX_HTML)
}

async fn health_check() -> &'static str {
    "ok"
}

async fn analyze_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, (StatusCode, String)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.csv").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        return Ok(Json(run_analysis(&state, &file_name, &bytes).await));
    }

    Err((StatusCode::BAD_REQUEST, "missing 'file' field".to_string()))
}

pub fn router(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_check))
        .route("/api/analyze", post(analyze_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
    shutdown.cancel();
}

/// Start the HTTP server hosting the upload page.
pub async fn start_api_server(config: &AppConfig, service: Arc<dyn AnalysisService>) -> anyhow::Result<()> {
    let state = AppState::new(service, &config.model, config.poll.clone());
    let shutdown = state.shutdown.clone();

    let allowed_origins = [
        format!("http://localhost:{}", config.port),
        format!("http://127.0.0.1:{}", config.port),
    ]
    .iter()
    .map(|o| o.parse::<HeaderValue>())
    .collect::<Result<Vec<_>, _>>()
    .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

    let app = router(state, allowed_origins);

    let addr = format!("{}:{}", config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
    tracing::info!("Sentiment analysis UI running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
    Ok(())
}
