//! Dehydration request repository.

use std::sync::Arc;

use crate::entities::{
    DehydrationRequest,
    dehydration_request::{self, RequestStatus},
};
use hydromed_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Filters for request listing. Deleted requests are always excluded.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    /// Restrict to a single owner.
    pub user_id: Option<String>,
    /// Restrict to a single status.
    pub status: Option<RequestStatus>,
    /// Formed-at lower bound (inclusive).
    pub formed_from: Option<DateTimeWithTimeZone>,
    /// Formed-at upper bound (inclusive).
    pub formed_to: Option<DateTimeWithTimeZone>,
    /// Exclude drafts (moderator views show only submitted requests).
    pub exclude_drafts: bool,
}

/// Request repository for database operations.
#[derive(Clone)]
pub struct RequestRepository {
    db: Arc<DatabaseConnection>,
}

impl RequestRepository {
    /// Create a new request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<dehydration_request::Model>> {
        DehydrationRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a request by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<dehydration_request::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {id} not found")))
    }

    /// Find the user's current draft, if any.
    pub async fn find_draft_by_user(
        &self,
        user_id: &str,
    ) -> AppResult<Option<dehydration_request::Model>> {
        DehydrationRequest::find()
            .filter(dehydration_request::Column::UserId.eq(user_id))
            .filter(dehydration_request::Column::Status.eq(RequestStatus::Draft))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new request row.
    ///
    /// A second draft for the same user violates the partial unique
    /// draft index and surfaces as `Conflict`.
    pub async fn create(
        &self,
        model: dehydration_request::ActiveModel,
    ) -> AppResult<dehydration_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| super::map_constraint_err(e, "user already has a draft request", "unknown user"))
    }

    /// Update a request.
    pub async fn update(
        &self,
        model: dehydration_request::ActiveModel,
    ) -> AppResult<dehydration_request::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List requests matching the filter, newest first.
    pub async fn list(&self, filter: &RequestFilter) -> AppResult<Vec<dehydration_request::Model>> {
        let mut query = DehydrationRequest::find()
            .filter(dehydration_request::Column::Status.ne(RequestStatus::Deleted))
            .order_by_desc(dehydration_request::Column::CreatedAt);

        if let Some(user_id) = &filter.user_id {
            query = query.filter(dehydration_request::Column::UserId.eq(user_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(dehydration_request::Column::Status.eq(status));
        }
        if let Some(from) = filter.formed_from {
            query = query.filter(dehydration_request::Column::FormedAt.gte(from));
        }
        if let Some(to) = filter.formed_to {
            query = query.filter(dehydration_request::Column::FormedAt.lte(to));
        }
        if filter.exclude_drafts {
            query = query.filter(dehydration_request::Column::Status.ne(RequestStatus::Draft));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a user's requests in a given status.
    pub async fn count_by_user_and_status(
        &self,
        user_id: &str,
        status: RequestStatus,
    ) -> AppResult<u64> {
        DehydrationRequest::find()
            .filter(dehydration_request::Column::UserId.eq(user_id))
            .filter(dehydration_request::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Atomically move a draft to formed.
    ///
    /// Single conditional `UPDATE ... WHERE id = ? AND status = 'draft'`;
    /// returns false when the guard did not match (already formed, deleted,
    /// or raced by another writer).
    pub async fn set_formed(&self, id: &str, at: DateTimeWithTimeZone) -> AppResult<bool> {
        let result = DehydrationRequest::update_many()
            .col_expr(
                dehydration_request::Column::Status,
                Expr::value(RequestStatus::Formed),
            )
            .col_expr(dehydration_request::Column::FormedAt, Expr::value(at))
            .filter(dehydration_request::Column::Id.eq(id))
            .filter(dehydration_request::Column::Status.eq(RequestStatus::Draft))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Atomically resolve a formed request to completed or rejected.
    ///
    /// Guarded on `status = 'formed'` so two moderators cannot both resolve
    /// the same request; returns false when the guard did not match.
    #[allow(clippy::too_many_arguments)]
    pub async fn set_resolved(
        &self,
        id: &str,
        verdict: RequestStatus,
        moderator_id: &str,
        at: DateTimeWithTimeZone,
        patient_weight: Option<f64>,
        dehydration_percent: Option<f64>,
        fluid_deficit: Option<f64>,
        doctor_comment: Option<String>,
    ) -> AppResult<bool> {
        debug_assert!(verdict.is_verdict());

        let mut update = DehydrationRequest::update_many()
            .col_expr(dehydration_request::Column::Status, Expr::value(verdict))
            .col_expr(dehydration_request::Column::CompletedAt, Expr::value(at))
            .col_expr(
                dehydration_request::Column::ModeratorId,
                Expr::value(moderator_id),
            );

        if let Some(weight) = patient_weight {
            update = update.col_expr(
                dehydration_request::Column::PatientWeight,
                Expr::value(weight),
            );
        }
        if let Some(percent) = dehydration_percent {
            update = update.col_expr(
                dehydration_request::Column::DehydrationPercent,
                Expr::value(percent),
            );
        }
        if let Some(deficit) = fluid_deficit {
            update = update.col_expr(
                dehydration_request::Column::FluidDeficit,
                Expr::value(deficit),
            );
        }
        if let Some(comment) = doctor_comment {
            update = update.col_expr(
                dehydration_request::Column::DoctorComment,
                Expr::value(comment),
            );
        }

        let result = update
            .filter(dehydration_request::Column::Id.eq(id))
            .filter(dehydration_request::Column::Status.eq(RequestStatus::Formed))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Soft-delete a request: the row and its links persist for audit, but
    /// every list and detail view excludes it from now on.
    pub async fn mark_deleted(&self, id: &str) -> AppResult<bool> {
        let result = DehydrationRequest::update_many()
            .col_expr(
                dehydration_request::Column::Status,
                Expr::value(RequestStatus::Deleted),
            )
            .filter(dehydration_request::Column::Id.eq(id))
            .filter(dehydration_request::Column::Status.ne(RequestStatus::Deleted))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}
