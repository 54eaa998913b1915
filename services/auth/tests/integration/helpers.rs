use std::sync::{Arc, Mutex};

use axum::Extension;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use locasso_auth::domain::repository::UserRepository;
use locasso_auth::domain::types::User;
use locasso_auth::error::AuthServiceError;
use locasso_auth::router::build_router;
use locasso_auth::state::AppState;
use locasso_auth::usecase::authenticate::AuthenticateUserInput;
use locasso_auth_migration::Migrator;
use locasso_auth_schema::users;
use locasso_auth_types::principal::Principal;
use locasso_domain::user::UserRole;

// ── MockUserRepo ─────────────────────────────────────────────────────────────

/// In-memory repository recording every write it receives.
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    pub finds: Arc<Mutex<u32>>,
    pub fail_writes: bool,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            finds: Arc::new(Mutex::new(0)),
            fail_writes: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Every create and update fails as if the store were unreachable.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Shared handle to the stored users for post-execution inspection.
    pub fn users_handle(&self) -> Arc<Mutex<Vec<User>>> {
        Arc::clone(&self.users)
    }

    pub fn finds_handle(&self) -> Arc<Mutex<u32>> {
        Arc::clone(&self.finds)
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_external_id(
        &self,
        external_id: &str,
        provider: &str,
    ) -> Result<Option<User>, AuthServiceError> {
        *self.finds.lock().unwrap() += 1;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.external_id == external_id && u.provider == provider)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        if self.fail_writes {
            return Err(AuthServiceError::PersistenceFailure(anyhow::anyhow!(
                "connection refused"
            )));
        }
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn update_last_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        if self.fail_writes {
            return Err(AuthServiceError::PersistenceFailure(anyhow::anyhow!(
                "connection refused"
            )));
        }
        let mut users = self.users.lock().unwrap();
        let user = users.iter_mut().find(|u| u.id == id).unwrap();
        user.last_login_at = at;
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn input(external_id: &str, email: &str, provider: &str) -> AuthenticateUserInput {
    AuthenticateUserInput {
        external_id: external_id.to_owned(),
        email: email.to_owned(),
        name: None,
        photo_url: None,
        provider: provider.to_owned(),
    }
}

/// A stored Guide signed up a day ago.
pub fn existing_user(external_id: &str, provider: &str) -> User {
    let yesterday = Utc::now() - chrono::Duration::days(1);
    User {
        id: Uuid::now_v7(),
        external_id: external_id.to_owned(),
        email: "stored@example.com".to_owned(),
        name: "Stored Name".to_owned(),
        photo_url: "https://img.example.com/stored.png".to_owned(),
        role: UserRole::Guide,
        provider: provider.to_owned(),
        created_at: yesterday,
        last_login_at: yesterday,
    }
}

// ── Database ─────────────────────────────────────────────────────────────────

/// Fresh in-memory SQLite database with every migration applied.
///
/// One pooled connection, so every query sees the same in-memory database.
pub async fn test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn user_count(db: &DatabaseConnection) -> u64 {
    users::Entity::find().count(db).await.unwrap()
}

// ── HTTP ─────────────────────────────────────────────────────────────────────

pub fn test_state(db: DatabaseConnection, dev_mode: bool) -> AppState {
    AppState { db, dev_mode }
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(build_router(state)).unwrap()
}

/// Server whose requests arrive already carrying `principal`, as if an upstream
/// authentication layer had run.
pub fn test_server_with_principal(state: AppState, principal: Principal) -> TestServer {
    TestServer::new(build_router(state).layer(Extension(principal))).unwrap()
}
