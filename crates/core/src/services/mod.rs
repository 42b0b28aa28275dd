//! Business logic services.

pub mod request;
pub mod symptom;
pub mod user;

pub use request::{
    AddSymptomInput, DraftSummary, LinkedSymptom, ListRequestsInput, RequestDetail,
    RequestService, ResolveInput, UpdateDraftInput, UpdateLinkInput,
};
pub use symptom::{CreateSymptomInput, SymptomService, SymptomView, UpdateSymptomInput};
pub use user::{CredentialsInput, ProfileView, RegisterInput, UserService};
