use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const DEFAULT_USER: &str = "testuser";
pub const DEFAULT_API_KEY: &str = "0123456789abcdef0123456789abcdef";

/// Preview window used when a create request has no `end`.
const DEFAULT_WINDOW_SECS: i64 = 24 * 60 * 60;

/// A stored historics preview job.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Preview {
    pub id: String,
    pub hash: String,
    pub start: i64,
    pub end: i64,
    pub sources: Vec<String>,
    pub parameters: Vec<String>,
    pub created_at: i64,
    pub progress: u8,
    pub status: String,
}

#[derive(Deserialize)]
pub struct CreatePreview {
    pub hash: String,
    pub start: i64,
    pub sources: String,
    #[serde(default)]
    pub parameters: String,
    pub end: Option<i64>,
}

#[derive(Deserialize)]
pub struct GetPreview {
    pub id: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    authorization: Arc<str>,
    previews: Arc<RwLock<HashMap<String, Preview>>>,
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "error": message })))
}

pub fn app() -> Router {
    app_with_credentials(DEFAULT_USER, DEFAULT_API_KEY)
}

pub fn app_with_credentials(user: &str, api_key: &str) -> Router {
    let state = AppState {
        authorization: Arc::from(format!("{user}:{api_key}")),
        previews: Arc::new(RwLock::new(HashMap::new())),
    };
    Router::new()
        .route("/v1.1/preview/create", post(create_preview))
        .route("/v1.1/preview/get", get(get_preview))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_credentials(listener, DEFAULT_USER, DEFAULT_API_KEY).await
}

pub async fn run_with_credentials(
    listener: TcpListener,
    user: &str,
    api_key: &str,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_credentials(user, api_key)).await
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if provided == Some(&*state.authorization) {
        return Ok(());
    }
    debug!("rejecting request with bad credentials");
    Err(api_error(
        StatusCode::UNAUTHORIZED,
        "Authorization failed. Please check your username and API key",
    ))
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_secs()).ok())
        .unwrap_or_default()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

async fn create_preview(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    authorize(&state, &headers)?;

    let input: CreatePreview = serde_json::from_str(&body)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, &format!("Invalid request body: {e}")))?;
    if input.hash.len() != 32 {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "The hash parameter must be a 32 character stream hash",
        ));
    }
    let sources = split_list(&input.sources);
    if sources.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "The sources parameter is required"));
    }
    let end = match input.end {
        Some(end) => end,
        None => input.start.checked_add(DEFAULT_WINDOW_SECS).ok_or_else(|| {
            api_error(StatusCode::BAD_REQUEST, "The start parameter is out of range")
        })?,
    };
    if end <= input.start {
        return Err(api_error(StatusCode::BAD_REQUEST, "The end parameter must be after start"));
    }

    let created_at = now();
    let preview = Preview {
        id: Uuid::new_v4().simple().to_string(),
        hash: input.hash,
        start: input.start,
        end,
        sources,
        parameters: split_list(&input.parameters),
        created_at,
        progress: 0,
        status: "queued".to_string(),
    };
    info!(id = %preview.id, hash = %preview.hash, "created preview");
    let response = json!({ "id": preview.id, "created_at": created_at });
    state.previews.write().await.insert(preview.id.clone(), preview);
    Ok((StatusCode::ACCEPTED, Json(response)))
}

async fn get_preview(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<GetPreview>,
) -> Result<Json<Preview>, ApiError> {
    authorize(&state, &headers)?;

    let id = params
        .id
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "The id parameter is required"))?;
    let previews = state.previews.read().await;
    previews
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Preview not found"))
}
