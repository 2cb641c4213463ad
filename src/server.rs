//! HTTP surface for reading time estimates.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /` | Index of content items with their estimates |
//! | `GET /items/{id}` | A content item rendered through the content-pipeline hook |
//! | `GET /api/reading-time/{id}` | On-demand estimate for a stored item |
//! | `POST /api/estimate` | On-demand estimate for raw content |
//! | `GET/PUT/DELETE /api/settings` | Read, replace or clear display settings |
//! | `GET /assets/style.css` | Stylesheet for the estimate wrapper |

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::constants::{STYLESHEET, STYLESHEET_PATH};
use crate::content::ContentSource;
use crate::errors::{ServerError, TemplateError};
use crate::service::ReadingTime;
use crate::settings::{Settings, SettingsInput};
use crate::templates::{IndexEntry, Templates};

/// Everything needed to start a [`Server`].
#[derive(Clone)]
pub struct ServerConfig {
    pub ip: [u8; 4],
    pub port: u16,
    pub reading_time: ReadingTime,
    pub source: Arc<dyn ContentSource>,
}

#[derive(Clone)]
pub struct ServerState {
    pub reading_time: ReadingTime,
    pub source: Arc<dyn ContentSource>,
    pub templates: Arc<Templates>,
}

pub struct Server {
    pub router: Router,
    pub port: u16,
    pub ip: [u8; 4],
}

#[derive(Debug, Serialize)]
struct QueryResponse {
    id: String,
    display: String,
    word_count: usize,
    minutes: usize,
}

#[derive(Debug, Deserialize)]
struct EstimateRequest {
    content: String,
}

#[derive(Debug, Serialize)]
struct EstimateResponse {
    display: String,
    word_count: usize,
    minutes: usize,
}

impl Server {
    pub fn init(config: ServerConfig) -> Result<Self, ServerError> {
        let state = ServerState {
            reading_time: config.reading_time,
            source: config.source,
            templates: Arc::new(Templates::new()?),
        };

        Ok(Server {
            router: Self::router(state),
            ip: config.ip,
            port: config.port,
        })
    }

    pub fn router(state: ServerState) -> Router {
        Router::new()
            .route("/", get(Self::index))
            .route("/items/{*id}", get(Self::item_page))
            .route("/api/reading-time/{*id}", get(Self::query_item))
            .route("/api/estimate", post(Self::estimate))
            .route(
                "/api/settings",
                get(Self::get_settings)
                    .put(Self::put_settings)
                    .delete(Self::delete_settings),
            )
            .route(STYLESHEET_PATH, get(Self::stylesheet))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    pub async fn start(&self) -> Result<(), ServerError> {
        let addr = SocketAddr::from((self.ip, self.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::BindFailed {
                addr: addr.to_string(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(ServerError::LocalAddrFailed)?;
        tracing::info!("Serving reading time estimates at http://{local_addr}/");
        axum::serve(listener, self.router.clone())
            .await
            .map_err(ServerError::StartFailed)
    }

    async fn index(State(state): State<ServerState>) -> Result<Html<String>, StatusCode> {
        let entries: Vec<IndexEntry> = state
            .source
            .ids()
            .into_iter()
            .filter_map(|id| state.source.get(&id))
            .map(|item| IndexEntry {
                display: state.reading_time.display_for(&item.body_html),
                id: item.id,
                title: item.title,
            })
            .collect();

        state
            .templates
            .render_index(&entries)
            .map(Html)
            .map_err(internal_error)
    }

    async fn item_page(
        Path(id): Path<String>,
        State(state): State<ServerState>,
    ) -> Result<Html<String>, StatusCode> {
        let id = id.trim_end_matches('/');
        tracing::debug!("got item request: {id}");

        let item = state.source.get(id).ok_or(StatusCode::NOT_FOUND)?;
        let body = state
            .reading_time
            .filter_content(&item.body_html, &item.category, true);

        state
            .templates
            .render_item(&item, &body)
            .map(Html)
            .map_err(internal_error)
    }

    async fn query_item(Path(id): Path<String>, State(state): State<ServerState>) -> Response {
        let id = id.trim_end_matches('/').to_string();
        let Some(item) = state.source.get(&id) else {
            let display = state.reading_time.query(state.source.as_ref(), &id);
            let body = QueryResponse {
                id,
                display,
                word_count: 0,
                minutes: 0,
            };
            return (StatusCode::NOT_FOUND, Json(body)).into_response();
        };

        let estimate = state.reading_time.estimate(&item.body_html);
        Json(QueryResponse {
            display: state.reading_time.query_content(&item.body_html),
            id,
            word_count: estimate.word_count,
            minutes: estimate.minutes,
        })
        .into_response()
    }

    async fn estimate(
        State(state): State<ServerState>,
        Json(request): Json<EstimateRequest>,
    ) -> Json<EstimateResponse> {
        let estimate = state.reading_time.estimate(&request.content);
        Json(EstimateResponse {
            display: state.reading_time.query_content(&request.content),
            word_count: estimate.word_count,
            minutes: estimate.minutes,
        })
    }

    async fn get_settings(State(state): State<ServerState>) -> Json<Settings> {
        Json(state.reading_time.settings())
    }

    async fn put_settings(
        State(state): State<ServerState>,
        Json(input): Json<SettingsInput>,
    ) -> Result<Json<Settings>, StatusCode> {
        state
            .reading_time
            .store()
            .set(input)
            .map(Json)
            .map_err(|e| {
                tracing::error!("Failed to save settings: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            })
    }

    async fn delete_settings(State(state): State<ServerState>) -> StatusCode {
        match state.reading_time.store().clear() {
            Ok(()) => StatusCode::NO_CONTENT,
            Err(e) => {
                tracing::error!("Failed to clear settings: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    async fn stylesheet() -> impl IntoResponse {
        (
            [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
            STYLESHEET,
        )
    }
}

fn internal_error(e: TemplateError) -> StatusCode {
    tracing::error!("Template rendering failed: {e}");
    StatusCode::INTERNAL_SERVER_ERROR
}
