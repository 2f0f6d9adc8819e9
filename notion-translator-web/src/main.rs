use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use notion_translator::config::{self, Credentials, DotenvMode};
use notion_translator::pipeline::{LanguageMode, LogProgress, PageTranslator, TranslationPolicy};
use notion_translator::{DeeplTranslator, MachineTranslator, NotionClient, PipelineError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateQuery {
    pub page_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub new_page_url: String,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Clone)]
pub struct AppState {
    pub translator: PageTranslator,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::load_dotenv(DotenvMode::Fill);

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let credentials = Credentials::from_env(true).inspect_err(|e| error!("{}", e))?;
    let store = NotionClient::new(credentials.notion_token.clone())?;
    let deepl_token = credentials.deepl_token.clone().unwrap_or_default();
    let provider: Arc<dyn MachineTranslator> = Arc::new(DeeplTranslator::new(deepl_token)?);

    let state = AppState {
        translator: PageTranslator::new(Arc::new(store), provider, TranslationPolicy::default())
            .with_progress(Arc::new(LogProgress)),
    };

    info!("Starting Notion translator server");

    let port = config::server_port()?;
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Server running at http://0.0.0.0:{}", port);

    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(translate_page))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn translate_page(
    State(state): State<AppState>,
    Query(query): Query<TranslateQuery>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let page_id = query
        .page_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing pageId query parameter"))?;

    info!("Translating page {}", page_id);

    let outcome = state
        .translator
        .translate_page(&page_id, LanguageMode::Detect)
        .await
        .map_err(|e| {
            error!("Translation of {} failed: {}", page_id, e);
            api_error(status_for(&e), &e.to_string())
        })?;

    info!(
        "Translated {} ({} → {}) into {}",
        page_id, outcome.pair.source, outcome.pair.target, outcome.page_id
    );

    Ok(Json(TranslateResponse {
        new_page_url: outcome.url.unwrap_or(outcome.page_id),
    }))
}

fn status_for(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::InvalidPageRef(_) => StatusCode::BAD_REQUEST,
        PipelineError::NotAPage(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::Unreadable { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}
