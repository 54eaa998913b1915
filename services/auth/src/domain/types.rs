use chrono::{DateTime, Utc};
use uuid::Uuid;

use locasso_domain::user::UserRole;

/// Stored user account, unique per (external_id, provider).
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    /// Subject identifier assigned by the identity provider.
    pub external_id: String,
    pub email: String,
    /// Empty when the provider did not share a display name.
    pub name: String,
    /// Empty when the provider did not share a photo.
    pub photo_url: String,
    pub role: UserRole,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

impl User {
    /// A first-time user with the default role, created and logged in at `now`.
    pub fn register(
        external_id: String,
        email: String,
        name: String,
        photo_url: String,
        provider: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            external_id,
            email,
            name,
            photo_url,
            role: UserRole::default(),
            provider,
            created_at: now,
            last_login_at: now,
        }
    }
}
