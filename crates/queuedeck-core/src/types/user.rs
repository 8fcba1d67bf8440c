//! Authenticated user profile.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated user as the console knows them.
///
/// This is the client's view of the identity service's user record; the
/// server remains the authority on all of these fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Optional display name shown in the console chrome.
    pub display_name: Option<String>,
}

impl UserProfile {
    /// Creates a profile without a display name.
    pub fn new(id: Uuid, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            display_name: None,
        }
    }
}
