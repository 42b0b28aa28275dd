//! Request-symptom link endpoints.

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::post,
};
use hydromed_common::AppResult;
use hydromed_core::request::{AddSymptomInput, UpdateLinkInput};
use hydromed_db::entities::request_symptom;
use serde::Deserialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// Body for attaching a symptom to a draft. An omitted `request_id`
/// targets the caller's draft, creating one if needed.
#[derive(Debug, Deserialize)]
pub struct AddLinkRequest {
    pub request_id: Option<String>,
    pub symptom_id: String,
    #[serde(flatten)]
    pub input: AddSymptomInput,
}

/// Body for updating a link's attributes.
#[derive(Debug, Deserialize)]
pub struct UpdateLinkRequest {
    pub request_id: String,
    pub symptom_id: String,
    #[serde(flatten)]
    pub input: UpdateLinkInput,
}

/// Body for detaching a symptom.
#[derive(Debug, Deserialize)]
pub struct RemoveLinkRequest {
    pub request_id: String,
    pub symptom_id: String,
}

/// Attach a symptom to a draft (owner only, idempotent).
async fn add(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddLinkRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .request_service
        .add_symptom(&identity, req.request_id.as_deref(), &req.symptom_id, req.input)
        .await?;

    Ok(ok())
}

/// Update link attributes (owner only, draft only).
async fn update(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateLinkRequest>,
) -> AppResult<ApiResponse<request_symptom::Model>> {
    let link = state
        .request_service
        .update_symptom_link(&identity, &req.request_id, &req.symptom_id, req.input)
        .await?;

    Ok(ApiResponse::ok(link))
}

/// Detach a symptom from a draft (owner only).
async fn remove(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RemoveLinkRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .request_service
        .remove_symptom(&identity, &req.request_id, &req.symptom_id)
        .await?;

    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(add).put(update).delete(remove))
}
