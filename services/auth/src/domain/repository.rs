#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::User;
use crate::error::AuthServiceError;

/// Repository for user accounts keyed by provider identity.
pub trait UserRepository: Send + Sync {
    async fn find_by_external_id(
        &self,
        external_id: &str,
        provider: &str,
    ) -> Result<Option<User>, AuthServiceError>;

    /// Insert a new user. Fails with `PersistenceFailure` when the
    /// (external_id, provider) pair already exists.
    async fn create(&self, user: &User) -> Result<(), AuthServiceError>;

    /// Set `last_login_at` and leave every other field untouched.
    async fn update_last_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError>;
}
