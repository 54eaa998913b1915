use chrono::Utc;

use locasso_auth_types::mask::mask_value;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::AuthServiceError;

pub struct AuthenticateUserInput {
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub provider: String,
}

#[derive(Debug)]
pub struct AuthenticateUserOutput {
    pub is_new_user: bool,
    pub user: User,
}

/// Resolves an external identity to a stored user, registering it on first sign-in.
pub struct AuthenticateUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> AuthenticateUserUseCase<R> {
    pub async fn execute(
        &self,
        input: AuthenticateUserInput,
    ) -> Result<AuthenticateUserOutput, AuthServiceError> {
        // 1. Reject before touching the store
        if input.external_id.is_empty() || input.email.is_empty() || input.provider.is_empty() {
            tracing::warn!(
                has_external_id = !input.external_id.is_empty(),
                has_email = !input.email.is_empty(),
                has_provider = !input.provider.is_empty(),
                "sign-in rejected: missing claims"
            );
            return Err(AuthServiceError::MissingClaims);
        }

        let now = Utc::now();

        // 2. Known identity: refresh last login only, profile fields stay as stored
        if let Some(mut user) = self
            .repo
            .find_by_external_id(&input.external_id, &input.provider)
            .await?
        {
            self.repo.update_last_login(user.id, now).await?;
            user.last_login_at = now;
            tracing::info!(user_id = %user.id, provider = %user.provider, "existing user signed in");
            return Ok(AuthenticateUserOutput {
                is_new_user: false,
                user,
            });
        }

        // 3. First sign-in. A concurrent first sign-in for the same identity loses on the
        //    unique index and surfaces as PersistenceFailure.
        let user = User::register(
            input.external_id,
            input.email,
            input.name.unwrap_or_default(),
            input.photo_url.unwrap_or_default(),
            input.provider,
            now,
        );
        self.repo.create(&user).await?;
        tracing::info!(
            user_id = %user.id,
            provider = %user.provider,
            external_id = %mask_value(&user.external_id),
            "new user created"
        );
        Ok(AuthenticateUserOutput {
            is_new_user: true,
            user,
        })
    }
}
