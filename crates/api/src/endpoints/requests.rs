//! Dehydration request lifecycle endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, put},
};
use hydromed_common::{AppError, AppResult};
use hydromed_core::request::{
    DraftSummary, ListRequestsInput, RequestDetail, ResolveInput, UpdateDraftInput,
};
use hydromed_db::entities::dehydration_request::{self, RequestStatus};
use serde::Deserialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// Body for resolving a formed request with a verdict.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    /// Target verdict: `completed` or `rejected`.
    pub status: RequestStatus,
    #[serde(flatten)]
    pub input: ResolveInput,
}

/// List requests visible to the caller.
async fn list(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListRequestsInput>,
) -> AppResult<ApiResponse<Vec<dehydration_request::Model>>> {
    let requests = state.request_service.list(&identity, &query).await?;
    Ok(ApiResponse::ok(requests))
}

/// The caller's draft and its symptom count, creating the draft if
/// missing.
async fn cart(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<DraftSummary>> {
    state.request_service.get_or_create_draft(&identity).await?;
    let summary = state.request_service.draft_summary(&identity).await?;

    Ok(ApiResponse::ok(summary))
}

/// Request detail with attached symptoms.
async fn get_request(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RequestDetail>> {
    let detail = state.request_service.get(&identity, &id).await?;
    Ok(ApiResponse::ok(detail))
}

/// Update draft intake fields (owner only).
async fn update_draft(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateDraftInput>,
) -> AppResult<ApiResponse<dehydration_request::Model>> {
    let request = state.request_service.update_draft(&identity, &id, req).await?;
    Ok(ApiResponse::ok(request))
}

/// Submit a draft for review (owner only).
async fn form(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<dehydration_request::Model>> {
    let request = state.request_service.form(&identity, &id).await?;
    Ok(ApiResponse::ok(request))
}

/// Complete or reject a formed request (moderator only).
async fn resolve(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ResolveRequest>,
) -> AppResult<ApiResponse<dehydration_request::Model>> {
    let request = match req.status {
        RequestStatus::Completed => {
            state
                .request_service
                .complete(&identity, &id, req.input)
                .await?
        }
        RequestStatus::Rejected => {
            state
                .request_service
                .reject(&identity, &id, req.input)
                .await?
        }
        _ => {
            return Err(AppError::BadRequest(
                "status must be completed or rejected".to_string(),
            ));
        }
    };

    Ok(ApiResponse::ok(request))
}

/// Soft-delete a request (owner only).
async fn delete(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.request_service.delete(&identity, &id).await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/cart", get(cart))
        .route("/{id}", get(get_request).put(update_draft).delete(delete))
        .route("/{id}/form", put(form))
        .route("/{id}/complete", put(resolve))
}
