//! Resolved caller identity.

use hydromed_db::entities::dehydration_request;
use serde::{Deserialize, Serialize};

/// Identity of an authenticated caller, resolved by the API layer from a
/// bearer token or session cookie and passed explicitly into every
/// operation. Services trust it unconditionally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// User ID.
    pub user_id: String,
    /// Login name.
    pub login: String,
    /// Whether the user may resolve formed requests.
    pub is_moderator: bool,
}

impl Identity {
    /// Whether this caller owns the given request.
    #[must_use]
    pub fn is_owner_of(&self, request: &dehydration_request::Model) -> bool {
        self.user_id == request.user_id
    }
}
