//! HTTP routes: upload dispatch, output serving, health

use crate::dispatch::{self, ProcessRequest};
use crate::ui;
use axum::{
    extract::{multipart::Multipart, DefaultBodyLimit, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use ovis_vision::VisionEngine;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

/// Uploads beyond this are refused outright.
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Shared request state: the engine (with its loaded weights) and the
/// directory processed videos are served from.
#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<VisionEngine>,
    pub output_dir: PathBuf,
}

/// The form's two-field outcome: exactly one of `message` and
/// `video_url` is set.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub message: Option<String>,
    pub video_url: Option<String>,
}

impl ProcessResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            video_url: None,
        }
    }

    fn success(video_url: impl Into<String>) -> Self {
        Self {
            message: None,
            video_url: Some(video_url.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: impl Into<String>, code: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
            code: code.to_string(),
        }),
    )
}

fn internal_error(error: impl Into<String>) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: error.into(),
            code: "INTERNAL_ERROR".to_string(),
        }),
    )
}

/// Build the application router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(ui::index_handler))
        .route("/health", get(health_handler))
        .route("/api/v1/process", post(process_handler))
        .route("/videos/:name", get(video_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Pull the form fields out of the multipart body. Transport-level
/// problems are 400s; semantic validation happens in the dispatcher.
async fn read_multipart(mut multipart: Multipart) -> Result<ProcessRequest, ApiError> {
    let mut request = ProcessRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("malformed multipart body: {}", e), "BAD_MULTIPART"))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("video") => {
                request.file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    bad_request(format!("failed to read upload: {}", e), "BAD_UPLOAD")
                })?;
                request.video = Some(bytes);
            }
            Some("mode") => {
                let text = field.text().await.map_err(|e| {
                    bad_request(format!("failed to read mode field: {}", e), "BAD_FIELD")
                })?;
                request.mode = Some(text);
            }
            Some("classes") => {
                let text = field.text().await.map_err(|e| {
                    bad_request(format!("failed to read classes field: {}", e), "BAD_FIELD")
                })?;
                request.classes = Some(text);
            }
            other => {
                warn!("Ignoring unexpected form field {:?}", other);
            }
        }
    }

    Ok(request)
}

/// The dispatcher endpoint: validate, route to track or segment, map
/// the outcome to the form's (message, video) pair. Pipeline failures
/// come back as messages, not transport errors.
async fn process_handler(
    State(state): State<ApiState>,
    multipart: Multipart,
) -> Result<Json<ProcessResponse>, ApiError> {
    let request = read_multipart(multipart).await?;

    let validated = match dispatch::validate(request) {
        Ok(validated) => validated,
        Err(message) => return Ok(Json(ProcessResponse::failure(message))),
    };

    info!(
        "Dispatching {} request for {:?} ({} classes)",
        validated.mode,
        validated.file_name,
        validated.classes.len()
    );

    // Stage the upload in a per-request scratch directory; it is
    // cleaned up when this handler returns.
    let scratch = tempfile::Builder::new()
        .prefix("ovis-upload-")
        .tempdir()
        .map_err(|e| internal_error(format!("failed to create scratch directory: {}", e)))?;
    let input_path = scratch.path().join(&validated.file_name);
    tokio::fs::write(&input_path, &validated.video)
        .await
        .map_err(|e| internal_error(format!("failed to stage upload: {}", e)))?;

    let engine = state.engine.clone();
    let mode = validated.mode;
    let classes = validated.classes;
    let input = input_path.clone();
    let outcome =
        tokio::task::spawn_blocking(move || engine.process(mode, &input, &classes)).await;

    let response = match outcome {
        Err(join_err) => {
            error!("Processing task panicked: {}", join_err);
            return Err(internal_error("processing task failed"));
        }
        Ok(Err(e)) => {
            warn!("Processing failed: {}", e);
            ProcessResponse::failure(format!("Processing failed due to an error: {}", e))
        }
        Ok(Ok(video)) => {
            if !video.path.exists() {
                ProcessResponse::failure(
                    "Error: Processed video file not found at the expected path.",
                )
            } else {
                match video.path.file_name().and_then(|n| n.to_str()) {
                    Some(name) => {
                        info!("Processed video saved at {:?}", video.path);
                        ProcessResponse::success(format!("/videos/{}", name))
                    }
                    None => ProcessResponse::failure(
                        "Error: Processed video has an unusable file name.",
                    ),
                }
            }
        }
    };

    Ok(Json(response))
}

/// Serve a processed video by name, looking under both per-mode
/// output directories.
async fn video_handler(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(bad_request("invalid video name", "INVALID_PATH"));
    }

    for subdir in ["tracking", "segmentation"] {
        let path = state.output_dir.join(subdir).join(&name);
        if path.exists() {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| internal_error(format!("failed to read video: {}", e)))?;
            return Ok(([(header::CONTENT_TYPE, "video/mp4")], bytes));
        }
    }

    Err((
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("no processed video named {:?}", name),
            code: "NOT_FOUND".to_string(),
        }),
    ))
}
