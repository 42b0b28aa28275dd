//! User registration, login, and profile endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use hydromed_common::{AppResult, IdGenerator, SessionData};
use hydromed_core::user::{CredentialsInput, ProfileView, RegisterInput};
use hydromed_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::{AppState, SESSION_COOKIE},
    response::ApiResponse,
};

/// Registration response.
#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub login: String,
    pub is_moderator: bool,
}

/// Login response. The JWT doubles as a header credential for clients
/// that do not keep cookies.
#[derive(Serialize)]
pub struct LoginResponse {
    pub id: String,
    pub login: String,
    pub is_moderator: bool,
    pub token: String,
}

/// Profile update request.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub login: String,
}

/// Create a new user account.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterInput>,
) -> AppResult<ApiResponse<RegisterResponse>> {
    let user = state.user_service.register(req).await?;

    Ok(ApiResponse::ok(RegisterResponse {
        id: user.id,
        login: user.login,
        is_moderator: user.is_moderator,
    }))
}

/// Log in with login and password.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsInput>,
) -> AppResult<Response> {
    let user = state.user_service.authenticate(req).await?;
    issue_credentials(&state, &user).await
}

/// Moderator login: promotes or registers the account as needed.
async fn login_moderator(
    State(state): State<AppState>,
    Json(req): Json<CredentialsInput>,
) -> AppResult<Response> {
    let user = state.user_service.login_moderator(req).await?;
    issue_credentials(&state, &user).await
}

/// Issue a JWT plus a session cookie for the authenticated user.
async fn issue_credentials(state: &AppState, user: &user::Model) -> AppResult<Response> {
    let token = state
        .tokens
        .generate(&user.id, &user.login, user.is_moderator)?;

    let session_id = IdGenerator::new().generate_session_id();
    state
        .sessions
        .create(
            &session_id,
            &SessionData {
                user_id: user.id.clone(),
                login: user.login.clone(),
                is_moderator: user.is_moderator,
            },
        )
        .await?;

    let cookie = format!(
        "{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        state.sessions.ttl_secs()
    );

    let body = ApiResponse::ok(LoginResponse {
        id: user.id.clone(),
        login: user.login.clone(),
        is_moderator: user.is_moderator,
        token,
    });

    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

/// Log out: delete the session and expire the cookie.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(session_id) = session_id_from_headers(&headers) {
        state.sessions.delete(&session_id).await?;
    }

    let expired = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0");
    Ok(([(header::SET_COOKIE, expired)], crate::response::ok()).into_response())
}

fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Current user's profile with request counters.
async fn profile(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ProfileView>> {
    let profile = state.user_service.profile(&identity.user_id).await?;
    Ok(ApiResponse::ok(profile))
}

/// Change the current user's login.
async fn update_profile(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<ApiResponse<RegisterResponse>> {
    let user = state
        .user_service
        .update_login(&identity.user_id, &req.login)
        .await?;

    Ok(ApiResponse::ok(RegisterResponse {
        id: user.id,
        login: user.login,
        is_moderator: user.is_moderator,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/login-moderator", post(login_moderator))
        .route("/logout", post(logout))
        .route("/profile", get(profile).put(update_profile))
}
