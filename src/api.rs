//! HTTP surface for pkgname.
//!
//! This module exposes a compact Axum router:
//!
//! - `GET /generate` – Return a random name from the serving corpus.
//! - `POST /validate` – Judge the form field `pkgname` and return every reason it was rejected.
//! - `GET /history` – Recently accepted (`goods`) and rejected (`bads`) names, oldest first.
//! - `GET /metrics` – Generation and validation counters.
//!
//! Any other path falls through to the static front-end, either preloaded in memory with
//! content-hash ETags or, in dev mode, read from disk on every request. Responses are gzipped
//! for clients that accept it.

use crate::assets::AssetStore;
use crate::metrics::MetricsSnapshot;
use crate::store::NameApi;
use axum::{
    Form, Json, Router,
    extract::{State, rejection::FormRejection},
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, services::ServeDir};

/// How the router serves everything outside the JSON endpoints.
pub enum StaticFiles {
    /// Serve from an in-memory asset table.
    Preloaded(Arc<AssetStore>),
    /// Serve straight from disk on every request.
    Disk(PathBuf),
    /// No static front-end; unknown paths return 404.
    Disabled,
}

struct AppState<S> {
    store: Arc<S>,
    history_window: usize,
    assets: Option<Arc<AssetStore>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            history_window: self.history_window,
            assets: self.assets.clone(),
        }
    }
}

/// Build the HTTP router over a shared store.
pub fn create_router<S>(store: Arc<S>, history_window: usize, static_files: StaticFiles) -> Router
where
    S: NameApi + 'static,
{
    let assets = match &static_files {
        StaticFiles::Preloaded(assets) => Some(Arc::clone(assets)),
        StaticFiles::Disk(_) | StaticFiles::Disabled => None,
    };
    let state = AppState {
        store,
        history_window,
        assets,
    };

    let router = Router::new()
        .route("/generate", get(generate::<S>))
        .route(
            "/validate",
            post(validate::<S>).fallback(validate_method_not_allowed),
        )
        .route("/history", get(history::<S>))
        .route("/metrics", get(metrics::<S>));

    let router = match static_files {
        StaticFiles::Preloaded(_) => router.fallback(serve_asset::<S>),
        StaticFiles::Disk(root) => router.fallback_service(ServeDir::new(root)),
        StaticFiles::Disabled => router,
    };

    router
        .with_state(state)
        .layer(CompressionLayer::new())
}

/// Body shared by error responses.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ErrorReply = (StatusCode, Json<ErrorResponse>);

fn error_reply(status: StatusCode, error: impl Into<String>) -> ErrorReply {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Response body for `GET /generate`.
#[derive(Serialize)]
struct GenerateResponse {
    error: String,
    pkgname: String,
}

/// Return a random name from the serving corpus.
async fn generate<S>(State(state): State<AppState<S>>) -> Json<GenerateResponse>
where
    S: NameApi,
{
    Json(GenerateResponse {
        error: String::new(),
        pkgname: state.store.generate(),
    })
}

/// Form body for `POST /validate`.
#[derive(Deserialize)]
struct ValidateRequest {
    #[serde(default)]
    pkgname: Option<String>,
}

/// Response body for `POST /validate`.
#[derive(Serialize)]
struct ValidateResponse {
    error: String,
    success: bool,
    pkgname: String,
    causes: Vec<String>,
}

/// Judge a candidate name, recording it in the store's history.
async fn validate<S>(
    State(state): State<AppState<S>>,
    form: Result<Form<ValidateRequest>, FormRejection>,
) -> Result<Json<ValidateResponse>, ErrorReply>
where
    S: NameApi,
{
    let Form(request) = form.map_err(|rejection| {
        tracing::debug!(%rejection, "Rejected validate body");
        error_reply(rejection.status(), rejection.body_text())
    })?;
    let Some(pkgname) = request.pkgname.filter(|name| !name.is_empty()) else {
        return Err(error_reply(StatusCode::BAD_REQUEST, "Need a package name."));
    };

    let validation = state.store.validate(&pkgname);
    tracing::info!(
        pkgname = %pkgname,
        success = validation.accepted,
        causes = validation.reasons.len(),
        "Validate request completed"
    );
    Ok(Json(ValidateResponse {
        error: String::new(),
        success: validation.accepted,
        pkgname,
        causes: validation.reasons,
    }))
}

/// Answer any method other than POST on `/validate`.
async fn validate_method_not_allowed() -> impl IntoResponse {
    (
        [(header::ALLOW, "POST")],
        error_reply(
            StatusCode::METHOD_NOT_ALLOWED,
            "Can only POST on this endpoint.",
        ),
    )
}

/// Response body for `GET /history`.
#[derive(Serialize)]
struct HistoryResponse {
    goods: Vec<String>,
    bads: Vec<String>,
}

/// Return the most recent accepted and rejected names.
async fn history<S>(State(state): State<AppState<S>>) -> Json<HistoryResponse>
where
    S: NameApi,
{
    let history = state.store.recent_history(state.history_window);
    Json(HistoryResponse {
        goods: history.accepted,
        bads: history.rejected,
    })
}

/// Return a snapshot of the store's activity counters.
async fn metrics<S>(State(state): State<AppState<S>>) -> Json<MetricsSnapshot>
where
    S: NameApi,
{
    Json(state.store.metrics_snapshot())
}

/// Serve a preloaded asset, answering revalidations with 304.
async fn serve_asset<S>(
    State(state): State<AppState<S>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response
where
    S: NameApi,
{
    let Some(asset) = state.assets.as_deref().and_then(|assets| assets.get(uri.path())) else {
        tracing::debug!(path = uri.path(), "Static asset not found");
        return StatusCode::NOT_FOUND.into_response();
    };

    let if_none_match = headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok());
    if asset.matches_etag(if_none_match) {
        return StatusCode::NOT_MODIFIED.into_response();
    }

    (
        [
            (header::ETAG, format!("\"{}\"", asset.etag)),
            (header::CONTENT_TYPE, asset.content_type.to_string()),
        ],
        asset.content.clone(),
    )
        .into_response()
}
