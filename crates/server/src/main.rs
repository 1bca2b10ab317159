use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use server_api::{list_records, sorted_records, ApiContext};
use shared::{
    domain::{Column, Record, SortDirection},
    error::{ApiError, ErrorCode},
    routes::{data_route, sorted_data_route},
};
use storage::Storage;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

mod app_state;
mod config;
mod page;

use app_state::AppState;
use config::{load_settings, prepare_data_path};

#[derive(Debug, Deserialize)]
struct PageQuery {
    sort: Option<String>,
    dir: Option<String>,
}

type HttpError = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    let data_path = prepare_data_path(&settings.data_path)?;
    let storage = Storage::open(&data_path).await.map_err(|error| {
        error!(
            data_path = %data_path.display(),
            %error,
            "failed to load dataset; verify the CSV header and numeric columns"
        );
        error
    })?;
    let rows = storage.len().await;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, rows, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route(data_route(), get(http_list_records))
        .route(sorted_data_route(), get(http_sorted_records))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PageQuery>,
) -> Result<Html<String>, HttpError> {
    let sort = match q.sort.as_deref() {
        Some(column) => {
            let column: Column = column
                .parse()
                .map_err(|e| (StatusCode::BAD_REQUEST, Json(ApiError::from(e))))?;
            let direction = SortDirection::from_segment(q.dir.as_deref().unwrap_or("asc"));
            Some((column, direction))
        }
        None => None,
    };

    let records = list_records(&state.api)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(e)))?;
    let html = page::render_page(records, sort).await.map_err(|e| {
        error!(error = %e, "failed to render board page");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(ErrorCode::Internal, e.to_string())),
        )
    })?;
    Ok(Html(html))
}

async fn http_list_records(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record>>, HttpError> {
    let records = list_records(&state.api)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(e)))?;
    Ok(Json(records))
}

async fn http_sorted_records(
    State(state): State<Arc<AppState>>,
    Path((column, direction)): Path<(String, String)>,
) -> Result<Json<Vec<Record>>, HttpError> {
    let records = sorted_records(&state.api, &column, &direction)
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(e)))?;
    Ok(Json(records))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
