//! Symptom catalog repository.

use std::sync::Arc;

use crate::entities::{Symptom, symptom};
use crate::repositories::map_constraint_err;
use hydromed_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// Symptom repository for database operations.
#[derive(Clone)]
pub struct SymptomRepository {
    db: Arc<DatabaseConnection>,
}

impl SymptomRepository {
    /// Create a new symptom repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List symptoms with optional title substring and active filters.
    pub async fn list(
        &self,
        title: Option<&str>,
        active: Option<bool>,
    ) -> AppResult<Vec<symptom::Model>> {
        let mut query = Symptom::find().order_by_asc(symptom::Column::Title);

        if let Some(title) = title {
            query = query.filter(symptom::Column::Title.contains(title));
        }
        if let Some(active) = active {
            query = query.filter(symptom::Column::IsActive.eq(active));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a symptom by ID, active or not.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<symptom::Model>> {
        Symptom::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a symptom by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<symptom::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Symptom {id} not found")))
    }

    /// Create a symptom. Duplicate titles surface as `Conflict`.
    pub async fn create(&self, model: symptom::ActiveModel) -> AppResult<symptom::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            map_constraint_err(e, "symptom title must be unique", "invalid symptom reference")
        })
    }

    /// Update a symptom.
    pub async fn update(&self, model: symptom::ActiveModel) -> AppResult<symptom::Model> {
        model.update(self.db.as_ref()).await.map_err(|e| {
            map_constraint_err(e, "symptom title must be unique", "invalid symptom reference")
        })
    }

    /// Replace the stored image key.
    pub async fn set_image(&self, id: &str, key: Option<String>) -> AppResult<symptom::Model> {
        let symptom = self.get_by_id(id).await?;
        let mut active: symptom::ActiveModel = symptom.into();
        active.image_key = Set(key);
        self.update(active).await
    }

    /// Mark a symptom inactive (soft delete).
    pub async fn deactivate(&self, id: &str) -> AppResult<symptom::Model> {
        let symptom = self.get_by_id(id).await?;
        let mut active: symptom::ActiveModel = symptom.into();
        active.is_active = Set(false);
        self.update(active).await
    }

    /// Hard-delete a symptom.
    ///
    /// Fails with `Validation` when request links still reference it (the
    /// foreign key is RESTRICT), so callers get a 400 rather than a 500.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Symptom::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| {
                map_constraint_err(e, "symptom title must be unique", "symptom is referenced by requests")
            })?;
        Ok(())
    }
}
