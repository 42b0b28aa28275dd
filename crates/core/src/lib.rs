//! Core business logic for hydromed.

pub mod estimator;
pub mod identity;
pub mod services;

pub use identity::Identity;
pub use services::*;
