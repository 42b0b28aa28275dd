//! HTTP API layer for hydromed.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: users/auth, symptom catalog, request lifecycle
//! - **Extractors**: authenticated identity from request extensions
//! - **Middleware**: bearer-token and session-cookie authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
