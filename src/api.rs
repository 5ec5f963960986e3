//! REST API — request/response schemas and axum handlers.
//!
//! Thin boundary over [`EntryService`]: every handler validates its inputs,
//! runs the service call on a blocking thread (the generator and SQLite are
//! synchronous), and maps [`ServiceError`] onto HTTP status codes with a
//! `{"detail": ...}` body. Extractor rejections (malformed JSON, bad query
//! or path params) are wrapped so they come back in the same shape.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::entry::service::{EntryService, GuidedFields, DEFAULT_LIST_LIMIT};
use crate::entry::store::ListFilter;
use crate::entry::types::{Entry, GenerationState};
use crate::errors::ServiceError;

/// Shared server state.
pub struct AppState {
    pub service: EntryService,
}

/// Request body for quick-mode entry creation.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub raw_text: String,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub skip_ai: bool,
}

/// Request body for guided-mode entry creation. At least one structured
/// field must be non-empty.
#[derive(Debug, Deserialize)]
pub struct CreateGuidedRequest {
    pub morning: Option<String>,
    pub afternoon: Option<String>,
    pub evening: Option<String>,
    pub thoughts: Option<String>,
    pub mood: Option<String>,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub skip_ai: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// An entry as returned by the API, with the derived generation state.
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub id: i64,
    pub date: NaiveDate,
    pub raw_text: String,
    pub narrative_text: Option<String>,
    pub title: Option<String>,
    pub generation_state: GenerationState,
}

impl From<Entry> for EntryResponse {
    fn from(entry: Entry) -> Self {
        let generation_state = entry.generation_state();
        Self {
            id: entry.id,
            date: entry.date,
            raw_text: entry.raw_text,
            narrative_text: entry.narrative_text,
            title: entry.title,
            generation_state,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntryListResponse {
    pub entries: Vec<EntryResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub filepath: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub ollama_available: bool,
    pub entry_count: i64,
}

/// Error body: `{"detail": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// A [`ServiceError`] mapped onto an HTTP response.
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) | ServiceError::EmptyRange(_) => StatusCode::NOT_FOUND,
            ServiceError::Store(_) | ServiceError::StorePoisoned | ServiceError::Export { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

/// `Json` extractor whose rejection (malformed body, wrong content type) is
/// rendered in the `{"detail": ...}` error shape instead of axum's
/// plain-text default.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}

/// `Query` with rejections mapped the same way.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}

/// `Path` with rejections mapped the same way (e.g. a non-numeric id).
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}

/// Run a synchronous service call on the blocking thread pool.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(format!("task failed: {e}")))?
        .map_err(ApiError::from)
}

// POST /entries
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateEntryRequest>,
) -> Result<(StatusCode, Json<EntryResponse>), ApiError> {
    let entry = blocking(move || {
        state
            .service
            .create_quick(&req.raw_text, req.date, req.skip_ai)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

// POST /entries/guided
pub async fn create_guided_entry(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateGuidedRequest>,
) -> Result<(StatusCode, Json<EntryResponse>), ApiError> {
    let entry = blocking(move || {
        let fields = GuidedFields {
            morning: req.morning,
            afternoon: req.afternoon,
            evening: req.evening,
            thoughts: req.thoughts,
            mood: req.mood,
        };
        state.service.create_guided(&fields, req.date, req.skip_ai)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

// GET /entries
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<EntryListResponse>, ApiError> {
    let entries = blocking(move || {
        state.service.list(ListFilter {
            limit: query.limit.unwrap_or(DEFAULT_LIST_LIMIT),
            start_date: query.start_date,
            end_date: query.end_date,
        })
    })
    .await?;

    let entries: Vec<EntryResponse> = entries.into_iter().map(Into::into).collect();
    let total = entries.len();
    Ok(Json(EntryListResponse { entries, total }))
}

// GET /entries/{id}
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<EntryResponse>, ApiError> {
    let entry = blocking(move || state.service.get(id)).await?;
    Ok(Json(entry.into()))
}

// POST /entries/{id}/regenerate
pub async fn regenerate_entry(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<EntryResponse>, ApiError> {
    let entry = blocking(move || state.service.regenerate(id)).await?;
    Ok(Json(entry.into()))
}

// DELETE /entries/{id}
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    blocking(move || state.service.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /export/{id}
pub async fn export_entry(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ExportResponse>, ApiError> {
    let path = blocking(move || state.service.export_entry(id)).await?;
    Ok(Json(ExportResponse {
        filepath: path.to_string_lossy().into_owned(),
    }))
}

// POST /export/weekly
pub async fn export_weekly(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExportResponse>, ApiError> {
    let path = blocking(move || state.service.export_weekly()).await?;
    Ok(Json(ExportResponse {
        filepath: path.to_string_lossy().into_owned(),
    }))
}

// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, ApiError> {
    let (available, count) = blocking(move || {
        let available = state.service.generator_available();
        let count = state.service.count()?;
        Ok((available, count))
    })
    .await?;

    Ok(Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        ollama_available: available,
        entry_count: count,
    }))
}
