use sea_orm::entity::prelude::*;

/// User record owned by the auth service.
///
/// `(external_id, provider)` is unique; the migration backs it with
/// `idx_users_external_id_provider`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub photo_url: String,
    pub role: i16,
    pub provider: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_login_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
