//! Symptom catalog service.

use std::sync::Arc;

use hydromed_common::{AppError, AppResult, IdGenerator, ImageStore, generate_image_key};
use hydromed_db::{
    entities::symptom,
    repositories::{RequestSymptomRepository, SymptomRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::Identity;

/// Symptom catalog service.
///
/// Catalog mutation is moderator-only; the image store is injected as a
/// narrow capability and symptoms hold only the returned key.
#[derive(Clone)]
pub struct SymptomService {
    symptom_repo: SymptomRepository,
    link_repo: RequestSymptomRepository,
    images: Arc<dyn ImageStore>,
    id_gen: IdGenerator,
}

/// Input for creating a catalog symptom.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSymptomInput {
    #[validate(length(min = 1, max = 128))]
    pub title: String,

    #[validate(length(min = 1, max = 64))]
    pub category: String,

    #[validate(length(max = 4096))]
    #[serde(default)]
    pub description: String,

    /// Severity tier label ("mild", "moderate", "severe").
    #[validate(length(min = 1, max = 64))]
    pub severity: String,

    #[validate(length(max = 128))]
    #[serde(default)]
    pub weight_loss: String,

    #[validate(length(max = 128))]
    #[serde(default)]
    pub fluid_need: String,

    #[validate(length(max = 128))]
    #[serde(default)]
    pub recovery_time: String,
}

/// Input for updating a catalog symptom. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSymptomInput {
    #[validate(length(min = 1, max = 128))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub category: Option<String>,

    #[validate(length(max = 4096))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub severity: Option<String>,

    #[validate(length(max = 128))]
    pub weight_loss: Option<String>,

    #[validate(length(max = 128))]
    pub fluid_need: Option<String>,

    #[validate(length(max = 128))]
    pub recovery_time: Option<String>,

    pub is_active: Option<bool>,
}

/// Catalog symptom with its image key resolved to a public URL.
#[derive(Debug, Serialize)]
pub struct SymptomView {
    #[serde(flatten)]
    pub symptom: symptom::Model,
    pub image_url: Option<String>,
}

impl SymptomService {
    /// Create a new symptom service.
    #[must_use]
    pub fn new(
        symptom_repo: SymptomRepository,
        link_repo: RequestSymptomRepository,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            symptom_repo,
            link_repo,
            images,
            id_gen: IdGenerator::new(),
        }
    }

    fn view(&self, symptom: symptom::Model) -> SymptomView {
        let image_url = symptom.image_key.as_deref().map(|k| self.images.public_url(k));
        SymptomView { symptom, image_url }
    }

    /// List catalog symptoms. Non-moderators only see active entries.
    pub async fn list(
        &self,
        identity: Option<&Identity>,
        title: Option<&str>,
        active: Option<bool>,
    ) -> AppResult<Vec<SymptomView>> {
        let is_moderator = identity.is_some_and(|i| i.is_moderator);
        let active = if is_moderator { active } else { Some(true) };

        let symptoms = self.symptom_repo.list(title, active).await?;
        Ok(symptoms.into_iter().map(|s| self.view(s)).collect())
    }

    /// Get a symptom by ID. Inactive entries are hidden from
    /// non-moderators.
    pub async fn get(&self, identity: Option<&Identity>, id: &str) -> AppResult<SymptomView> {
        let symptom = self.symptom_repo.get_by_id(id).await?;

        let is_moderator = identity.is_some_and(|i| i.is_moderator);
        if !symptom.is_active && !is_moderator {
            return Err(AppError::NotFound(format!("Symptom {id} not found")));
        }

        Ok(self.view(symptom))
    }

    /// Create a catalog symptom (moderator only).
    pub async fn create(
        &self,
        identity: &Identity,
        input: CreateSymptomInput,
    ) -> AppResult<SymptomView> {
        require_moderator(identity)?;
        input.validate()?;

        let model = symptom::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            category: Set(input.category),
            description: Set(input.description),
            severity: Set(input.severity),
            weight_loss: Set(input.weight_loss),
            fluid_need: Set(input.fluid_need),
            recovery_time: Set(input.recovery_time),
            image_key: Set(None),
            is_active: Set(true),
        };

        let symptom = self.symptom_repo.create(model).await?;
        info!(symptom_id = %symptom.id, title = %symptom.title, "Created symptom");
        Ok(self.view(symptom))
    }

    /// Update a catalog symptom (moderator only).
    pub async fn update(
        &self,
        identity: &Identity,
        id: &str,
        input: UpdateSymptomInput,
    ) -> AppResult<SymptomView> {
        require_moderator(identity)?;
        input.validate()?;

        let symptom = self.symptom_repo.get_by_id(id).await?;
        let mut active: symptom::ActiveModel = symptom.into();

        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(severity) = input.severity {
            active.severity = Set(severity);
        }
        if let Some(weight_loss) = input.weight_loss {
            active.weight_loss = Set(weight_loss);
        }
        if let Some(fluid_need) = input.fluid_need {
            active.fluid_need = Set(fluid_need);
        }
        if let Some(recovery_time) = input.recovery_time {
            active.recovery_time = Set(recovery_time);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }

        let symptom = self.symptom_repo.update(active).await?;
        Ok(self.view(symptom))
    }

    /// Soft-delete a symptom (moderator only): mark inactive so historical
    /// request links stay valid.
    pub async fn deactivate(&self, identity: &Identity, id: &str) -> AppResult<SymptomView> {
        require_moderator(identity)?;

        let symptom = self.symptom_repo.deactivate(id).await?;
        info!(symptom_id = %id, "Deactivated symptom");
        Ok(self.view(symptom))
    }

    /// Hard-delete a symptom (moderator only).
    ///
    /// Refused while any request link still references it. The stored
    /// image, if any, is deleted afterwards.
    pub async fn delete(&self, identity: &Identity, id: &str) -> AppResult<()> {
        require_moderator(identity)?;

        let symptom = self.symptom_repo.get_by_id(id).await?;

        if self.link_repo.exists_for_symptom(id).await? {
            return Err(AppError::Validation(
                "symptom is referenced by requests".to_string(),
            ));
        }

        self.symptom_repo.delete(id).await?;

        if let Some(key) = symptom.image_key {
            self.images.delete_image(&key).await?;
        }

        info!(symptom_id = %id, "Deleted symptom");
        Ok(())
    }

    /// Upload or replace the symptom image (moderator only).
    pub async fn upload_image(
        &self,
        identity: &Identity,
        id: &str,
        original_name: &str,
        data: &[u8],
    ) -> AppResult<SymptomView> {
        require_moderator(identity)?;

        if data.is_empty() {
            return Err(AppError::BadRequest("image file is empty".to_string()));
        }

        let symptom = self.symptom_repo.get_by_id(id).await?;

        let key = generate_image_key(&symptom.title, original_name);
        let stored = self.images.upload_image(&key, data).await?;

        let updated = self.symptom_repo.set_image(id, Some(stored.key)).await?;

        // Drop the previous image only after the new one is committed
        if let Some(old_key) = symptom.image_key {
            self.images.delete_image(&old_key).await?;
        }

        info!(symptom_id = %id, key = %key, size = stored.size, "Uploaded symptom image");
        Ok(self.view(updated))
    }

    /// Remove the symptom image (moderator only).
    pub async fn delete_image(&self, identity: &Identity, id: &str) -> AppResult<SymptomView> {
        require_moderator(identity)?;

        let symptom = self.symptom_repo.get_by_id(id).await?;

        let Some(key) = symptom.image_key else {
            return Err(AppError::NotFound(format!("Symptom {id} has no image")));
        };

        let updated = self.symptom_repo.set_image(id, None).await?;
        self.images.delete_image(&key).await?;

        Ok(self.view(updated))
    }
}

/// Fail closed unless the caller is a moderator.
fn require_moderator(identity: &Identity) -> AppResult<()> {
    if identity.is_moderator {
        Ok(())
    } else {
        Err(AppError::Forbidden("moderator access required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    struct NullImageStore;

    #[async_trait::async_trait]
    impl ImageStore for NullImageStore {
        async fn upload_image(
            &self,
            key: &str,
            data: &[u8],
        ) -> AppResult<hydromed_common::StoredImage> {
            Ok(hydromed_common::StoredImage {
                key: key.to_string(),
                url: format!("/img/{key}"),
                size: data.len() as u64,
                md5: String::new(),
            })
        }

        async fn delete_image(&self, _key: &str) -> AppResult<()> {
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("/img/{key}")
        }
    }

    fn identity(is_moderator: bool) -> Identity {
        Identity {
            user_id: "u1".to_string(),
            login: "alice".to_string(),
            is_moderator,
        }
    }

    fn create_mock_symptom(id: &str, title: &str, is_active: bool) -> symptom::Model {
        symptom::Model {
            id: id.to_string(),
            title: title.to_string(),
            category: "general".to_string(),
            description: String::new(),
            severity: "mild".to_string(),
            weight_loss: "1-2%".to_string(),
            fluid_need: "30-50 ml/kg".to_string(),
            recovery_time: "1-2 days".to_string(),
            image_key: None,
            is_active,
        }
    }

    fn create_test_service(db: Arc<sea_orm::DatabaseConnection>) -> SymptomService {
        SymptomService::new(
            SymptomRepository::new(db.clone()),
            RequestSymptomRepository::new(db),
            Arc::new(NullImageStore),
        )
    }

    #[tokio::test]
    async fn test_create_requires_moderator() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(db);

        let result = service
            .create(
                &identity(false),
                CreateSymptomInput {
                    title: "Dry mouth".to_string(),
                    category: "oral".to_string(),
                    description: String::new(),
                    severity: "mild".to_string(),
                    weight_loss: String::new(),
                    fluid_need: String::new(),
                    recovery_time: String::new(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_get_hides_inactive_from_regular_users() {
        let inactive = create_mock_symptom("s1", "Dry mouth", false);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[inactive]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service.get(Some(&identity(false)), "s1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_shows_inactive_to_moderators() {
        let inactive = create_mock_symptom("s1", "Dry mouth", false);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[inactive]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let view = service.get(Some(&identity(true)), "s1").await.unwrap();

        assert_eq!(view.symptom.id, "s1");
        assert!(!view.symptom.is_active);
    }

    #[tokio::test]
    async fn test_delete_refused_while_referenced() {
        let symptom = create_mock_symptom("s1", "Dry mouth", true);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[symptom]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(3))
                }]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service.delete(&identity(true), "s1").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_upload_image_rejects_empty_file() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(db);

        let result = service
            .upload_image(&identity(true), "s1", "photo.jpg", &[])
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
