//! API middleware.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use hydromed_common::{SessionStore, TokenService};
use hydromed_core::{Identity, RequestService, SymptomService, UserService};

/// Cookie carrying the session ID.
pub const SESSION_COOKIE: &str = "session_id";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub symptom_service: SymptomService,
    pub request_service: RequestService,
    pub sessions: SessionStore,
    pub tokens: TokenService,
}

/// Authentication middleware.
///
/// Resolves a bearer JWT or the session cookie to an [`Identity`] and
/// stores it in request extensions. Session hits extend the sliding TTL.
/// Requests without a valid credential pass through unauthenticated;
/// handlers that need an identity reject them via the extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(identity) = resolve_identity(&state, req.headers()).await {
        req.extensions_mut().insert(identity);
    }

    next.run(req).await
}

async fn resolve_identity(state: &AppState, headers: &HeaderMap) -> Option<Identity> {
    // Bearer token first
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(claims) = state.tokens.validate(token)
    {
        return Some(Identity {
            user_id: claims.user_id,
            login: claims.login,
            is_moderator: claims.is_moderator,
        });
    }

    // Then the session cookie
    let session_id = session_id_from_cookies(headers)?;
    let session = state.sessions.get(&session_id).await.ok().flatten()?;

    // Sliding expiration
    state.sessions.extend(&session_id).await.ok();

    Some(Identity {
        user_id: session.user_id,
        login: session.login,
        is_moderator: session.is_moderator,
    })
}

fn session_id_from_cookies(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get("Cookie")?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}
