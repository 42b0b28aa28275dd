//! Dehydration request lifecycle service.
//!
//! Owns the draft → formed → {completed, rejected} workflow plus the
//! soft-delete marker. Every mutation checks ownership and lifecycle
//! state before touching storage, and the state-changing writes go
//! through status-guarded conditional updates so concurrent callers
//! cannot double-form or double-resolve a request.

use chrono::Utc;
use hydromed_common::{AppError, AppResult, IdGenerator};
use hydromed_db::{
    entities::{
        dehydration_request::{self, RequestStatus},
        request_symptom, symptom,
    },
    repositories::{
        RequestFilter, RequestRepository, RequestSymptomRepository, SymptomRepository,
    },
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::estimator::{estimate_percent, fluid_deficit};
use crate::Identity;

/// Request lifecycle service.
#[derive(Clone)]
pub struct RequestService {
    request_repo: RequestRepository,
    link_repo: RequestSymptomRepository,
    symptom_repo: SymptomRepository,
    id_gen: IdGenerator,
}

/// Filters for request listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListRequestsInput {
    pub status: Option<RequestStatus>,
    /// Formed-at lower bound (inclusive).
    pub formed_from: Option<chrono::DateTime<chrono::Utc>>,
    /// Formed-at upper bound (inclusive).
    pub formed_to: Option<chrono::DateTime<chrono::Utc>>,
}

/// Input for updating draft intake fields.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateDraftInput {
    /// Patient weight in kilograms.
    #[validate(range(min = 1.0, max = 500.0))]
    pub patient_weight: Option<f64>,

    /// Owner's note to the reviewing moderator.
    #[validate(length(max = 4096))]
    pub doctor_comment: Option<String>,
}

/// Input for attaching a symptom to a draft.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AddSymptomInput {
    /// Patient-reported intensity.
    #[validate(range(min = 1, max = 10))]
    pub intensity: Option<i32>,

    #[serde(default)]
    pub is_main: bool,

    #[validate(length(max = 2048))]
    pub comment: Option<String>,
}

/// Input for updating a symptom link. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateLinkInput {
    #[validate(range(min = 1, max = 10))]
    pub intensity: Option<i32>,

    pub is_main: Option<bool>,

    #[validate(length(max = 2048))]
    pub comment: Option<String>,
}

/// Input for completing or rejecting a formed request.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ResolveInput {
    /// Patient weight in kilograms; falls back to the draft's stored
    /// weight when absent.
    #[validate(range(min = 1.0, max = 500.0))]
    pub patient_weight: Option<f64>,

    /// Explicit dehydration percentage; estimated from symptom
    /// severities when absent.
    #[validate(range(min = 0.0, max = 20.0))]
    pub dehydration_percent: Option<f64>,

    #[validate(length(max = 4096))]
    pub doctor_comment: Option<String>,
}

/// The current draft, if any, with its symptom count.
#[derive(Debug, Serialize)]
pub struct DraftSummary {
    pub request_id: Option<String>,
    pub symptom_count: u64,
}

/// A catalog symptom as attached to a request.
#[derive(Debug, Serialize)]
pub struct LinkedSymptom {
    #[serde(flatten)]
    pub symptom: symptom::Model,
    pub intensity: Option<i32>,
    pub is_main: bool,
    pub comment: Option<String>,
}

/// A request with its attached symptoms.
#[derive(Debug, Serialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: dehydration_request::Model,
    pub symptoms: Vec<LinkedSymptom>,
}

impl RequestService {
    /// Create a new request service.
    #[must_use]
    pub fn new(
        request_repo: RequestRepository,
        link_repo: RequestSymptomRepository,
        symptom_repo: SymptomRepository,
    ) -> Self {
        Self {
            request_repo,
            link_repo,
            symptom_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Find or create the caller's draft.
    ///
    /// At most one draft exists per user, enforced by lookup-then-create;
    /// if a concurrent create races past the lookup the insert conflict
    /// is resolved by retrying the lookup.
    pub async fn get_or_create_draft(
        &self,
        identity: &Identity,
    ) -> AppResult<dehydration_request::Model> {
        if let Some(draft) = self.request_repo.find_draft_by_user(&identity.user_id).await? {
            return Ok(draft);
        }

        let model = dehydration_request::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(identity.user_id.clone()),
            status: Set(RequestStatus::Draft),
            created_at: Set(Utc::now().into()),
            formed_at: Set(None),
            completed_at: Set(None),
            moderator_id: Set(None),
            patient_weight: Set(None),
            dehydration_percent: Set(None),
            fluid_deficit: Set(None),
            doctor_comment: Set(None),
        };

        match self.request_repo.create(model).await {
            Ok(draft) => {
                info!(request_id = %draft.id, user_id = %identity.user_id, "Created draft request");
                Ok(draft)
            }
            Err(AppError::Conflict(_)) => self
                .request_repo
                .find_draft_by_user(&identity.user_id)
                .await?
                .ok_or_else(|| AppError::Internal("draft lookup failed after conflict".to_string())),
            Err(e) => Err(e),
        }
    }

    /// The caller's current draft and its symptom count, without creating
    /// one.
    pub async fn draft_summary(&self, identity: &Identity) -> AppResult<DraftSummary> {
        let Some(draft) = self.request_repo.find_draft_by_user(&identity.user_id).await? else {
            return Ok(DraftSummary {
                request_id: None,
                symptom_count: 0,
            });
        };

        let symptom_count = self.link_repo.count(&draft.id).await?;

        Ok(DraftSummary {
            request_id: Some(draft.id),
            symptom_count,
        })
    }

    /// List requests visible to the caller, newest first.
    ///
    /// Regular users see their own requests. Moderators see every
    /// submitted request plus their own drafts; other users' drafts stay
    /// private until formed.
    pub async fn list(
        &self,
        identity: &Identity,
        input: &ListRequestsInput,
    ) -> AppResult<Vec<dehydration_request::Model>> {
        let filter = RequestFilter {
            user_id: (!identity.is_moderator).then(|| identity.user_id.clone()),
            status: input.status,
            formed_from: input.formed_from.map(Into::into),
            formed_to: input.formed_to.map(Into::into),
            exclude_drafts: false,
        };

        let mut requests = self.request_repo.list(&filter).await?;

        if identity.is_moderator {
            requests.retain(|r| {
                r.status != RequestStatus::Draft || r.user_id == identity.user_id
            });
        }

        Ok(requests)
    }

    /// Request detail with attached symptoms.
    pub async fn get(&self, identity: &Identity, id: &str) -> AppResult<RequestDetail> {
        let request = self.fetch_visible(id).await?;

        if !identity.is_owner_of(&request) && !identity.is_moderator {
            return Err(AppError::Forbidden("not the request owner".to_string()));
        }

        let symptoms = self
            .link_repo
            .list_with_symptoms(&request.id)
            .await?
            .into_iter()
            .map(|(link, symptom)| LinkedSymptom {
                symptom,
                intensity: link.intensity,
                is_main: link.is_main,
                comment: link.comment,
            })
            .collect();

        Ok(RequestDetail { request, symptoms })
    }

    /// Update draft intake fields (owner only, draft only).
    pub async fn update_draft(
        &self,
        identity: &Identity,
        id: &str,
        input: UpdateDraftInput,
    ) -> AppResult<dehydration_request::Model> {
        input.validate()?;

        let request = self.editable_draft(identity, id).await?;
        let mut active: dehydration_request::ActiveModel = request.into();

        if let Some(weight) = input.patient_weight {
            active.patient_weight = Set(Some(weight));
        }
        if let Some(comment) = input.doctor_comment {
            active.doctor_comment = Set(Some(comment));
        }

        self.request_repo.update(active).await
    }

    /// Attach a symptom to a draft (owner only, draft only).
    ///
    /// When `request_id` is omitted the caller's draft is targeted,
    /// creating one if needed. Adding an already-attached symptom is a
    /// no-op; exactly one link row per (request, symptom) pair exists
    /// afterwards.
    pub async fn add_symptom(
        &self,
        identity: &Identity,
        request_id: Option<&str>,
        symptom_id: &str,
        input: AddSymptomInput,
    ) -> AppResult<()> {
        input.validate()?;

        let request = match request_id {
            Some(id) => self.editable_draft(identity, id).await?,
            None => self.get_or_create_draft(identity).await?,
        };

        let symptom = self.symptom_repo.get_by_id(symptom_id).await?;
        if !symptom.is_active {
            return Err(AppError::Validation(format!(
                "symptom {symptom_id} is no longer available"
            )));
        }

        let model = request_symptom::ActiveModel {
            id: Set(self.id_gen.generate()),
            request_id: Set(request.id),
            symptom_id: Set(symptom_id.to_string()),
            intensity: Set(input.intensity),
            is_main: Set(input.is_main),
            comment: Set(input.comment),
        };

        self.link_repo.add(model).await
    }

    /// Update link attributes (owner only, draft only).
    pub async fn update_symptom_link(
        &self,
        identity: &Identity,
        request_id: &str,
        symptom_id: &str,
        input: UpdateLinkInput,
    ) -> AppResult<request_symptom::Model> {
        input.validate()?;

        self.editable_draft(identity, request_id).await?;

        let link = self.link_repo.get_link(request_id, symptom_id).await?;
        let mut active: request_symptom::ActiveModel = link.into();

        if let Some(intensity) = input.intensity {
            active.intensity = Set(Some(intensity));
        }
        if let Some(is_main) = input.is_main {
            active.is_main = Set(is_main);
        }
        if let Some(comment) = input.comment {
            active.comment = Set(Some(comment));
        }

        self.link_repo.update_link(active).await
    }

    /// Detach a symptom from a draft (owner only, draft only).
    pub async fn remove_symptom(
        &self,
        identity: &Identity,
        request_id: &str,
        symptom_id: &str,
    ) -> AppResult<()> {
        self.editable_draft(identity, request_id).await?;

        if !self.link_repo.remove(request_id, symptom_id).await? {
            return Err(AppError::NotFound(format!(
                "Symptom {symptom_id} is not attached to request {request_id}"
            )));
        }

        Ok(())
    }

    /// Submit a draft for moderator review (owner only).
    ///
    /// Requires at least one attached symptom; freezes the request
    /// contents.
    pub async fn form(&self, identity: &Identity, id: &str) -> AppResult<dehydration_request::Model> {
        let request = self.fetch_visible(id).await?;

        if !identity.is_owner_of(&request) {
            return Err(AppError::Forbidden("not the request owner".to_string()));
        }
        if !request.status.can_transition_to(RequestStatus::Formed) {
            return Err(AppError::InvalidState(
                "only draft requests can be formed".to_string(),
            ));
        }

        if self.link_repo.count(id).await? == 0 {
            return Err(AppError::EmptyRequest(
                "request has no symptoms attached".to_string(),
            ));
        }

        // Guard re-evaluated at write time
        if !self.request_repo.set_formed(id, Utc::now().into()).await? {
            return Err(AppError::InvalidState(
                "request is no longer in draft state".to_string(),
            ));
        }

        info!(request_id = %id, user_id = %identity.user_id, "Formed request");
        self.request_repo.get_by_id(id).await
    }

    /// Complete a formed request with a fluid-deficit verdict (moderator
    /// only).
    ///
    /// Weight comes from the input or falls back to the draft's stored
    /// weight; the percentage is explicit or estimated from the attached
    /// symptom severities.
    pub async fn complete(
        &self,
        identity: &Identity,
        id: &str,
        input: ResolveInput,
    ) -> AppResult<dehydration_request::Model> {
        input.validate()?;
        let request = self.resolvable(identity, id).await?;

        let links = self.link_repo.list_with_symptoms(id).await?;
        let severities: Vec<&str> = links.iter().map(|(_, s)| s.severity.as_str()).collect();

        let (weight, percent, deficit) = completion_values(&request, &severities, &input)?;

        if !self
            .request_repo
            .set_resolved(
                id,
                RequestStatus::Completed,
                &identity.user_id,
                Utc::now().into(),
                Some(weight),
                Some(percent),
                Some(deficit),
                input.doctor_comment,
            )
            .await?
        {
            return Err(AppError::InvalidState(
                "request has already been resolved".to_string(),
            ));
        }

        info!(
            request_id = %id,
            moderator_id = %identity.user_id,
            percent,
            deficit,
            "Completed request"
        );
        self.request_repo.get_by_id(id).await
    }

    /// Reject a formed request (moderator only). No computation occurs.
    pub async fn reject(
        &self,
        identity: &Identity,
        id: &str,
        input: ResolveInput,
    ) -> AppResult<dehydration_request::Model> {
        input.validate()?;
        self.resolvable(identity, id).await?;

        if !self
            .request_repo
            .set_resolved(
                id,
                RequestStatus::Rejected,
                &identity.user_id,
                Utc::now().into(),
                None,
                None,
                None,
                input.doctor_comment,
            )
            .await?
        {
            return Err(AppError::InvalidState(
                "request has already been resolved".to_string(),
            ));
        }

        info!(request_id = %id, moderator_id = %identity.user_id, "Rejected request");
        self.request_repo.get_by_id(id).await
    }

    /// Soft-delete a request (owner only).
    ///
    /// The row and its links persist for audit; all views treat the
    /// request as missing from now on.
    pub async fn delete(&self, identity: &Identity, id: &str) -> AppResult<()> {
        let request = self.fetch_visible(id).await?;

        if !identity.is_owner_of(&request) {
            return Err(AppError::Forbidden("not the request owner".to_string()));
        }

        if !self.request_repo.mark_deleted(id).await? {
            return Err(AppError::NotFound(format!("Request {id} not found")));
        }

        info!(request_id = %id, user_id = %identity.user_id, "Deleted request");
        Ok(())
    }

    /// Fetch a request, treating soft-deleted rows as missing.
    async fn fetch_visible(&self, id: &str) -> AppResult<dehydration_request::Model> {
        let request = self.request_repo.get_by_id(id).await?;

        if request.status == RequestStatus::Deleted {
            return Err(AppError::NotFound(format!("Request {id} not found")));
        }

        Ok(request)
    }

    /// Fetch a request and check the owner + draft-editable guards.
    async fn editable_draft(
        &self,
        identity: &Identity,
        id: &str,
    ) -> AppResult<dehydration_request::Model> {
        let request = self.fetch_visible(id).await?;

        if !identity.is_owner_of(&request) {
            return Err(AppError::Forbidden("not the request owner".to_string()));
        }
        if !request.status.is_editable() {
            return Err(AppError::InvalidState(
                "request is not in draft state".to_string(),
            ));
        }

        Ok(request)
    }

    /// Fetch a request and check the moderator + formed guards.
    async fn resolvable(
        &self,
        identity: &Identity,
        id: &str,
    ) -> AppResult<dehydration_request::Model> {
        if !identity.is_moderator {
            return Err(AppError::Forbidden("moderator access required".to_string()));
        }

        let request = self.fetch_visible(id).await?;

        if request.status != RequestStatus::Formed {
            return Err(AppError::InvalidState(
                "only formed requests can be resolved".to_string(),
            ));
        }

        Ok(request)
    }
}

/// Resolve the weight, percentage, and fluid deficit for completion.
fn completion_values(
    request: &dehydration_request::Model,
    severities: &[&str],
    input: &ResolveInput,
) -> AppResult<(f64, f64, f64)> {
    let weight = input
        .patient_weight
        .or(request.patient_weight)
        .ok_or_else(|| AppError::BadRequest("patient weight is required".to_string()))?;

    let percent = input
        .dehydration_percent
        .unwrap_or_else(|| estimate_percent(severities.iter().copied()));

    Ok((weight, percent, fluid_deficit(weight, percent)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn identity(user_id: &str, is_moderator: bool) -> Identity {
        Identity {
            user_id: user_id.to_string(),
            login: format!("{user_id}-login"),
            is_moderator,
        }
    }

    fn create_mock_request(
        id: &str,
        user_id: &str,
        status: RequestStatus,
    ) -> dehydration_request::Model {
        dehydration_request::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            status,
            created_at: Utc::now().into(),
            formed_at: None,
            completed_at: None,
            moderator_id: None,
            patient_weight: None,
            dehydration_percent: None,
            fluid_deficit: None,
            doctor_comment: None,
        }
    }

    fn create_test_service(db: Arc<sea_orm::DatabaseConnection>) -> RequestService {
        RequestService::new(
            RequestRepository::new(db.clone()),
            RequestSymptomRepository::new(db.clone()),
            SymptomRepository::new(db),
        )
    }

    #[test]
    fn test_completion_values_explicit() {
        let request = create_mock_request("r1", "u1", RequestStatus::Formed);
        let input = ResolveInput {
            patient_weight: Some(70.0),
            dehydration_percent: Some(5.0),
            doctor_comment: None,
        };

        let (weight, percent, deficit) = completion_values(&request, &[], &input).unwrap();

        assert!((weight - 70.0).abs() < f64::EPSILON);
        assert!((percent - 5.0).abs() < f64::EPSILON);
        assert!((deficit - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_completion_values_fall_back_to_stored_weight() {
        let mut request = create_mock_request("r1", "u1", RequestStatus::Formed);
        request.patient_weight = Some(80.0);

        let input = ResolveInput {
            dehydration_percent: Some(5.0),
            ..ResolveInput::default()
        };
        let (weight, percent, deficit) = completion_values(&request, &[], &input).unwrap();

        assert!((weight - 80.0).abs() < f64::EPSILON);
        assert!((percent - 5.0).abs() < f64::EPSILON);
        assert!((deficit - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_completion_values_ignore_stored_percent() {
        // Only the moderator's body value or the estimator decides the
        // percentage; whatever is on the row does not.
        let mut request = create_mock_request("r1", "u1", RequestStatus::Formed);
        request.patient_weight = Some(70.0);
        request.dehydration_percent = Some(12.0);

        let (_, percent, _) =
            completion_values(&request, &["mild"], &ResolveInput::default()).unwrap();

        assert!((percent - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_completion_values_estimate_from_severities() {
        let mut request = create_mock_request("r1", "u1", RequestStatus::Formed);
        request.patient_weight = Some(70.0);

        let (_, percent, deficit) =
            completion_values(&request, &["mild", "severe"], &ResolveInput::default()).unwrap();

        assert!((percent - 4.75).abs() < f64::EPSILON);
        assert!((deficit - 3.325).abs() < 1e-9);
    }

    #[test]
    fn test_completion_values_require_weight() {
        let request = create_mock_request("r1", "u1", RequestStatus::Formed);

        let result = completion_values(&request, &["severe"], &ResolveInput::default());

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_form_requires_symptoms() {
        let draft = create_mock_request("r1", "u1", RequestStatus::Draft);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(0))
                }]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service.form(&identity("u1", false), "r1").await;

        assert!(matches!(result, Err(AppError::EmptyRequest(_))));
    }

    #[tokio::test]
    async fn test_form_rejects_non_owner() {
        let draft = create_mock_request("r1", "u1", RequestStatus::Draft);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service.form(&identity("u2", false), "r1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_form_rejects_formed_request() {
        let formed = create_mock_request("r1", "u1", RequestStatus::Formed);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[formed]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service.form(&identity("u1", false), "r1").await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_complete_requires_moderator() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(db);

        let result = service
            .complete(&identity("u1", false), "r1", ResolveInput::default())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_complete_rejects_draft() {
        let draft = create_mock_request("r1", "u1", RequestStatus::Draft);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service
            .complete(&identity("mod1", true), "r1", ResolveInput::default())
            .await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_deleted_request_is_not_found() {
        let deleted = create_mock_request("r1", "u1", RequestStatus::Deleted);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[deleted]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service.get(&identity("u1", false), "r1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_rejects_unrelated_user() {
        let formed = create_mock_request("r1", "u1", RequestStatus::Formed);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[formed]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service.get(&identity("u2", false), "r1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_rejects_non_owner() {
        let draft = create_mock_request("r1", "u1", RequestStatus::Draft);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service.delete(&identity("u2", false), "r1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_add_symptom_rejects_inactive_symptom() {
        let draft = create_mock_request("r1", "u1", RequestStatus::Draft);
        let inactive = symptom::Model {
            id: "s1".to_string(),
            title: "Dry mouth".to_string(),
            category: "oral".to_string(),
            description: String::new(),
            severity: "mild".to_string(),
            weight_loss: String::new(),
            fluid_need: String::new(),
            recovery_time: String::new(),
            image_key: None,
            is_active: false,
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft]])
                .append_query_results([[inactive]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service
            .add_symptom(
                &identity("u1", false),
                Some("r1"),
                "s1",
                AddSymptomInput::default(),
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_symptom_without_request_targets_caller_draft() {
        let draft = create_mock_request("r1", "u1", RequestStatus::Draft);
        let active = symptom::Model {
            id: "s1".to_string(),
            title: "Dry mouth".to_string(),
            category: "oral".to_string(),
            description: String::new(),
            severity: "mild".to_string(),
            weight_loss: String::new(),
            fluid_need: String::new(),
            recovery_time: String::new(),
            image_key: None,
            is_active: true,
        };
        let link = request_symptom::Model {
            id: "l1".to_string(),
            request_id: "r1".to_string(),
            symptom_id: "s1".to_string(),
            intensity: None,
            is_main: false,
            comment: None,
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft]])
                .append_query_results([[active]])
                .append_query_results([[link]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service
            .add_symptom(&identity("u1", false), None, "s1", AddSymptomInput::default())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_draft_stores_doctor_comment() {
        let draft = create_mock_request("r1", "u1", RequestStatus::Draft);
        let mut updated = draft.clone();
        updated.doctor_comment = Some("fever since Tuesday".to_string());
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft]])
                .append_query_results([[updated]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let input = UpdateDraftInput {
            doctor_comment: Some("fever since Tuesday".to_string()),
            ..UpdateDraftInput::default()
        };
        let result = service
            .update_draft(&identity("u1", false), "r1", input)
            .await
            .unwrap();

        assert_eq!(result.doctor_comment.as_deref(), Some("fever since Tuesday"));
    }

    #[tokio::test]
    async fn test_get_or_create_draft_retries_after_conflict() {
        let draft = create_mock_request("r1", "u1", RequestStatus::Draft);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<dehydration_request::Model>::new()])
                .append_query_errors([sea_orm::DbErr::Custom(
                    "duplicate key value violates unique constraint \"ux_request_user_draft\""
                        .to_string(),
                )])
                .append_query_results([[draft]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service.get_or_create_draft(&identity("u1", false)).await;

        assert_eq!(result.unwrap().id, "r1");
    }
}
