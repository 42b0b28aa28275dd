//! Database entities.

pub mod dehydration_request;
pub mod request_symptom;
pub mod symptom;
pub mod user;

pub use dehydration_request::Entity as DehydrationRequest;
pub use request_symptom::Entity as RequestSymptom;
pub use symptom::Entity as Symptom;
pub use user::Entity as User;
