use anyhow::{Context as _, anyhow};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr,
};
use uuid::Uuid;

use locasso_auth_schema::users;
use locasso_domain::user::UserRole;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::AuthServiceError;

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_external_id(
        &self,
        external_id: &str,
        provider: &str,
    ) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::ExternalId.eq(external_id))
            .filter(users::Column::Provider.eq(provider))
            .one(&self.db)
            .await
            .persistence("find user by external id")?;
        model.map(user_from_model).transpose()
    }

    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(user.id),
            external_id: Set(user.external_id.clone()),
            email: Set(user.email.clone()),
            name: Set(user.name.clone()),
            photo_url: Set(user.photo_url.clone()),
            role: Set(user.role.as_i16()),
            provider: Set(user.provider.clone()),
            created_at: Set(user.created_at),
            last_login_at: Set(user.last_login_at),
        }
        .insert(&self.db)
        .await
        .persistence("create user")?;
        Ok(())
    }

    async fn update_last_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(id),
            last_login_at: Set(at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .persistence("update last login")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> Result<User, AuthServiceError> {
    let role = UserRole::from_i16(model.role)
        .ok_or_else(|| anyhow!("unknown role value {}", model.role))
        .context("map user row")?;
    Ok(User {
        id: model.id,
        external_id: model.external_id,
        email: model.email,
        name: model.name,
        photo_url: model.photo_url,
        role,
        provider: model.provider,
        created_at: model.created_at,
        last_login_at: model.last_login_at,
    })
}

/// Maps store errors to `PersistenceFailure`, logging unique-index violations.
trait PersistenceContext<T> {
    fn persistence(self, action: &'static str) -> Result<T, AuthServiceError>;
}

impl<T> PersistenceContext<T> for Result<T, DbErr> {
    fn persistence(self, action: &'static str) -> Result<T, AuthServiceError> {
        self.map_err(|e| {
            if let Some(SqlErr::UniqueConstraintViolation(detail)) = e.sql_err() {
                tracing::warn!(action, detail, "user already exists for provider identity");
            }
            AuthServiceError::PersistenceFailure(anyhow::Error::new(e).context(action))
        })
    }
}
