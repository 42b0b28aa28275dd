//! Database repositories.

mod request;
mod request_symptom;
mod symptom;
mod user;

pub use request::{RequestFilter, RequestRepository};
pub use request_symptom::RequestSymptomRepository;
pub use symptom::SymptomRepository;
pub use user::UserRepository;

use hydromed_common::AppError;
use sea_orm::DbErr;

/// Remap a constraint-violation database error to a client error.
///
/// Unique-index violations become `Conflict` and foreign-key violations
/// become `Validation` (both 400); anything else stays `Database` (500).
pub(crate) fn map_constraint_err(err: DbErr, unique_msg: &str, fk_msg: &str) -> AppError {
    let text = err.to_string();
    let lower = text.to_lowercase();

    if lower.contains("23505") || lower.contains("unique") || lower.contains("duplicate key") {
        AppError::Conflict(unique_msg.to_string())
    } else if lower.contains("23503") || lower.contains("foreign key") {
        AppError::Validation(fk_msg.to_string())
    } else {
        AppError::Database(text)
    }
}
