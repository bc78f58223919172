/// HTTP handlers for upload, chat and health.
///
/// Errors are returned as [`AppError`], which renders `{ "error": ... }`
/// with the matching status code.
use std::path::Path;

use axum::{
    Form, Json, async_trait,
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::server::AppContext;

// ── Request/response types ───────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub chunks: usize,
    pub generation: u64,
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub generation: Option<u64>,
    pub chunks: usize,
    pub source: Option<String>,
    pub indexed_at: Option<DateTime<Utc>>,
}

/// The `query` field of a chat request.
///
/// Accepts both `application/x-www-form-urlencoded` and `multipart/form-data`
/// bodies, since browsers posting a `FormData` object send the latter.
#[derive(Debug)]
pub struct ChatQuery(pub String);

#[async_trait]
impl<S> FromRequest<S> for ChatQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(form) = Form::<ChatForm>::from_request(req, state)
                .await
                .map_err(|e| AppError::InvalidRequest(e.body_text()))?;
            return Ok(ChatQuery(form.query));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::InvalidRequest(e.body_text()))?;
        while let Some(field) = multipart.next_field().await? {
            if field.name() == Some("query") {
                return Ok(ChatQuery(field.text().await?));
            }
        }

        Err(AppError::InvalidRequest("missing 'query' field".to_string()))
    }
}

// ── Handlers ─────────────────────────────────────────────────────────

/// `POST /upload`: ingest the multipart `file` field, replacing the current index.
pub async fn upload_handler(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        // Some clients send a full path; keep the final component only
        let filename = field
            .file_name()
            .and_then(|name| Path::new(name).file_name())
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidRequest("file field has no filename".to_string()))?;

        // Exceeding the body limit surfaces here as a 413
        let bytes = field.bytes().await?;

        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::InvalidRequest("missing 'file' field".to_string()))?;

    let report = ctx.ingestor.ingest(bytes.to_vec(), &filename).await?;

    Ok(Json(UploadResponse {
        message: format!(
            "{} embedded and stored ({} chunks).",
            report.filename, report.chunks
        ),
        filename: report.filename,
        chunks: report.chunks,
        generation: report.generation,
    }))
}

/// `POST /chat`: answer the `query` field from the current index.
pub async fn chat_handler(
    State(ctx): State<AppContext>,
    ChatQuery(query): ChatQuery,
) -> Result<Json<ChatResponse>, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidRequest("query must not be empty".to_string()));
    }

    let context = ctx.retriever.retrieve(query).await?;
    let response = ctx.composer.answer(query, &context).await?;

    Ok(Json(ChatResponse { response }))
}

/// `GET /health`: liveness plus a summary of the live index generation.
pub async fn health_handler(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    let snapshot = ctx.store.snapshot().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        generation: snapshot.as_ref().map(|g| g.id),
        chunks: snapshot.as_ref().map_or(0, |g| g.index.len()),
        source: snapshot.as_ref().map(|g| g.source.clone()),
        indexed_at: snapshot.as_ref().map(|g| g.built_at),
    })
}
