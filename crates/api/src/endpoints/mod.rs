//! API endpoints.

mod auth;
mod request_symptoms;
mod requests;
mod symptoms;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/users", auth::router())
        .nest("/symptoms", symptoms::router())
        .nest("/requests", requests::router())
        .nest("/request-symptoms", request_symptoms::router())
}
