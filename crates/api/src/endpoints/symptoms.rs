//! Symptom catalog endpoints.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use hydromed_common::{AppError, AppResult};
use hydromed_core::symptom::{CreateSymptomInput, SymptomView, UpdateSymptomInput};
use serde::Deserialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// Catalog list filters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Title substring filter.
    pub title: Option<String>,
    /// Active filter; ignored for non-moderators, who only see active
    /// entries.
    pub active: Option<bool>,
}

/// List catalog symptoms.
async fn list(
    MaybeAuthUser(identity): MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<SymptomView>>> {
    let symptoms = state
        .symptom_service
        .list(identity.as_ref(), query.title.as_deref(), query.active)
        .await?;

    Ok(ApiResponse::ok(symptoms))
}

/// Get a symptom by ID.
async fn get_symptom(
    MaybeAuthUser(identity): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SymptomView>> {
    let symptom = state.symptom_service.get(identity.as_ref(), &id).await?;
    Ok(ApiResponse::ok(symptom))
}

/// Create a catalog symptom (moderator only).
async fn create(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateSymptomInput>,
) -> AppResult<ApiResponse<SymptomView>> {
    let symptom = state.symptom_service.create(&identity, req).await?;
    Ok(ApiResponse::ok(symptom))
}

/// Update a catalog symptom (moderator only).
async fn update(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSymptomInput>,
) -> AppResult<ApiResponse<SymptomView>> {
    let symptom = state.symptom_service.update(&identity, &id, req).await?;
    Ok(ApiResponse::ok(symptom))
}

/// Hard-delete a catalog symptom (moderator only). Refused while any
/// request still references it.
async fn delete(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.symptom_service.delete(&identity, &id).await?;
    Ok(ok())
}

/// Mark a symptom inactive (moderator only).
async fn deactivate(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SymptomView>> {
    let symptom = state.symptom_service.deactivate(&identity, &id).await?;
    Ok(ApiResponse::ok(symptom))
}

/// Upload or replace the symptom image (moderator only, multipart).
async fn upload_image(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<SymptomView>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let Some(file_name) = field.file_name().map(ToString::to_string) else {
            continue;
        };

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

        let symptom = state
            .symptom_service
            .upload_image(&identity, &id, &file_name, &data)
            .await?;

        return Ok(ApiResponse::ok(symptom));
    }

    Err(AppError::BadRequest("no image file in request".to_string()))
}

/// Remove the symptom image (moderator only).
async fn delete_image(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SymptomView>> {
    let symptom = state.symptom_service.delete_image(&identity, &id).await?;
    Ok(ApiResponse::ok(symptom))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_symptom).put(update).delete(delete))
        .route("/{id}/deactivate", post(deactivate))
        .route("/{id}/image", post(upload_image).delete(delete_image))
}
