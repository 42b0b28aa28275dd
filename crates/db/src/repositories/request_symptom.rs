//! Request-symptom link repository.

use std::sync::Arc;

use crate::entities::{RequestSymptom, Symptom, request_symptom, symptom};
use hydromed_common::{AppError, AppResult};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

/// Link repository for the request-symptom join table.
#[derive(Clone)]
pub struct RequestSymptomRepository {
    db: Arc<DatabaseConnection>,
}

impl RequestSymptomRepository {
    /// Create a new link repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Add a symptom to a request.
    ///
    /// Idempotent on the (request, symptom) pair: a duplicate add is
    /// swallowed by `ON CONFLICT DO NOTHING` and returns Ok. A dangling
    /// symptom or request ID surfaces as `Validation`.
    pub async fn add(&self, model: request_symptom::ActiveModel) -> AppResult<()> {
        let result = RequestSymptom::insert(model)
            .on_conflict(
                OnConflict::columns([
                    request_symptom::Column::RequestId,
                    request_symptom::Column::SymptomId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(self.db.as_ref())
            .await;

        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(super::map_constraint_err(
                e,
                "symptom already attached",
                "unknown request or symptom",
            )),
        }
    }

    /// Find the link row for a (request, symptom) pair.
    pub async fn find_link(
        &self,
        request_id: &str,
        symptom_id: &str,
    ) -> AppResult<Option<request_symptom::Model>> {
        RequestSymptom::find()
            .filter(request_symptom::Column::RequestId.eq(request_id))
            .filter(request_symptom::Column::SymptomId.eq(symptom_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the link row for a pair, returning an error if not found.
    pub async fn get_link(
        &self,
        request_id: &str,
        symptom_id: &str,
    ) -> AppResult<request_symptom::Model> {
        self.find_link(request_id, symptom_id).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "Symptom {symptom_id} is not attached to request {request_id}"
            ))
        })
    }

    /// Update link attributes (intensity, main flag, comment).
    pub async fn update_link(
        &self,
        model: request_symptom::ActiveModel,
    ) -> AppResult<request_symptom::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Detach a symptom from a request. Returns false when no link existed.
    pub async fn remove(&self, request_id: &str, symptom_id: &str) -> AppResult<bool> {
        let result = RequestSymptom::delete_many()
            .filter(request_symptom::Column::RequestId.eq(request_id))
            .filter(request_symptom::Column::SymptomId.eq(symptom_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Count links on a request.
    pub async fn count(&self, request_id: &str) -> AppResult<u64> {
        RequestSymptom::find()
            .filter(request_symptom::Column::RequestId.eq(request_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count links on a request that carry a non-empty comment.
    pub async fn count_with_comment(&self, request_id: &str) -> AppResult<u64> {
        RequestSymptom::find()
            .filter(request_symptom::Column::RequestId.eq(request_id))
            .filter(request_symptom::Column::Comment.is_not_null())
            .filter(request_symptom::Column::Comment.ne(""))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List links on a request together with their catalog symptoms,
    /// main symptoms first.
    pub async fn list_with_symptoms(
        &self,
        request_id: &str,
    ) -> AppResult<Vec<(request_symptom::Model, symptom::Model)>> {
        let rows = RequestSymptom::find()
            .filter(request_symptom::Column::RequestId.eq(request_id))
            .order_by_desc(request_symptom::Column::IsMain)
            .order_by_asc(request_symptom::Column::Id)
            .find_also_related(Symptom)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // The FK is RESTRICT, so the related symptom always exists; a None
        // here means the schema was tampered with.
        rows.into_iter()
            .map(|(link, symptom)| {
                let symptom = symptom.ok_or_else(|| {
                    AppError::Database(format!("dangling symptom link {}", link.id))
                })?;
                Ok((link, symptom))
            })
            .collect()
    }

    /// Whether any request still references the symptom.
    pub async fn exists_for_symptom(&self, symptom_id: &str) -> AppResult<bool> {
        let count = RequestSymptom::find()
            .filter(request_symptom::Column::SymptomId.eq(symptom_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Set};

    fn link_model() -> request_symptom::ActiveModel {
        request_symptom::ActiveModel {
            id: Set("l1".to_string()),
            request_id: Set("r1".to_string()),
            symptom_id: Set("s1".to_string()),
            intensity: Set(None),
            is_main: Set(false),
            comment: Set(None),
        }
    }

    #[tokio::test]
    async fn test_add_swallows_duplicate_pair() {
        // ON CONFLICT DO NOTHING returns no row for an already-linked
        // pair; the second add must still succeed.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<request_symptom::Model>::new()])
                .into_connection(),
        );
        let repo = RequestSymptomRepository::new(db);

        assert!(repo.add(link_model()).await.is_ok());
    }

    #[tokio::test]
    async fn test_add_maps_fk_violation_to_validation() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom(
                    "insert violates foreign key constraint (SQLSTATE 23503)".to_string(),
                )])
                .into_connection(),
        );
        let repo = RequestSymptomRepository::new(db);

        let result = repo.add(link_model()).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
