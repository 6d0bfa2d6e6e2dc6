//! HTTP surface: routing, CORS, and the fetch_stream orchestration

use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info};
use url::Url;

use rezka_core::{
    assemble, select_preferred, ApiResponse, Catalog, Error, RezkaCatalog, StreamRequest,
    StreamResolver, TranslatorRef,
};

use crate::config::ServerConfig;

/// Warning surfaced when the preference list was exhausted and the site's
/// own priority pick was used instead
const PREFERRED_UNAVAILABLE: &str = "Preferred translator unavailable; using the site's default.";

/// Shared per-process state; every request is otherwise independent
pub struct AppState {
    catalog: Arc<dyn Catalog>,
    resolver: StreamResolver,
    preferred: Vec<TranslatorRef>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let timeout = Duration::from_millis(config.request_timeout_ms);
        Ok(Self {
            catalog: Arc::new(RezkaCatalog::new(base_url, timeout)?),
            resolver: StreamResolver::new(timeout)?,
            preferred: config.preferred_refs(),
        })
    }

    /// title → search → load → select translator → resolve → assemble
    async fn fetch(
        &self,
        title: &str,
        season: Option<u32>,
        episode: Option<u32>,
    ) -> Result<ApiResponse, Error> {
        let hits = self.catalog.search(title).await?;
        let hit = hits
            .first()
            .ok_or_else(|| Error::NoSearchResults(title.to_string()))?;
        info!(url = %hit.url, title = %hit.title, "selected search hit");

        let media = self.catalog.load_media(&hit.url).await?;
        let selection = select_preferred(&media.translators, &self.preferred)?;
        let warning = selection
            .fallback_used
            .then(|| PREFERRED_UNAVAILABLE.to_string());

        let request = StreamRequest {
            season,
            episode,
            translator: Some(TranslatorRef::Id(selection.id)),
        };
        let result = self.resolver.resolve(&media, &request).await?;
        Ok(assemble(&result, warning))
    }
}

/// Build the application router with CORS from config
pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/fetch_stream", get(fetch_stream))
        .route("/health", get(health))
        .layer(cors_layer(config))
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    // explicit method/header lists: tower-http rejects wildcards when
    // credentials are allowed
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

#[derive(Debug, Deserialize)]
struct FetchStreamQuery {
    title: Option<String>,
    season: Option<u32>,
    episode: Option<u32>,
}

async fn fetch_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FetchStreamQuery>,
) -> Response {
    let Some(title) = query.title.filter(|t| !t.trim().is_empty()) else {
        error!("title is required but not provided");
        return detail_response(StatusCode::BAD_REQUEST, "Title is required");
    };

    info!(
        %title,
        season = ?query.season,
        episode = ?query.episode,
        "fetch_stream"
    );

    match state.fetch(&title, query.season, query.episode).await {
        Ok(response) => Json(response).into_response(),
        Err(err) if err.is_internal() => {
            error!(code = err.error_code(), %err, "internal fault during stream fetch");
            detail_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
        Err(err) => {
            error!(code = err.error_code(), %err, "stream fetch failed");
            Json(ApiResponse::from_error(err.to_string())).into_response()
        }
    }
}

async fn health() -> Response {
    Json(json!({"status": "ok"})).into_response()
}

fn detail_response(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({"detail": detail}))).into_response()
}
