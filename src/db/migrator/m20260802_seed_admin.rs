use crate::entities::prelude::*;
use crate::entities::{profiles, users};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Default API key for the seeded admin (regenerate in production)
const DEFAULT_API_KEY: &str = "foody_default_api_key_please_regenerate";

const ADMIN_EMAIL: &str = "admin@foody.local";

/// Hash the default password using Argon2id
fn hash_default_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let password = b"password";
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password, &salt)
        .expect("Failed to hash default password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = chrono::Utc::now().to_rfc3339();
        let password_hash = hash_default_password();

        let insert_user = Query::insert()
            .into_table(Users)
            .columns([
                users::Column::Email,
                users::Column::Name,
                users::Column::PasswordHash,
                users::Column::ApiKey,
                users::Column::IsActive,
                users::Column::IsSuperuser,
                users::Column::CreatedAt,
                users::Column::UpdatedAt,
            ])
            .values_panic([
                ADMIN_EMAIL.into(),
                "Admin".into(),
                password_hash.into(),
                DEFAULT_API_KEY.into(),
                true.into(),
                true.into(),
                now.clone().into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert_user).await?;

        let backend = manager.get_database_backend();
        let select_id = backend.build(
            Query::select()
                .column(users::Column::Id)
                .from(Users)
                .and_where(Expr::col(users::Column::Email).eq(ADMIN_EMAIL)),
        );

        let row = manager
            .get_connection()
            .query_one(select_id)
            .await?
            .ok_or_else(|| DbErr::Custom("Seeded admin user not found".to_string()))?;
        let admin_id: i32 = row.try_get("", "id")?;

        let insert_profile = Query::insert()
            .into_table(Profiles)
            .columns([
                profiles::Column::UserId,
                profiles::Column::Role,
                profiles::Column::IsVerified,
            ])
            .values_panic([admin_id.into(), "admin".into(), true.into()])
            .to_owned();

        manager.exec_stmt(insert_profile).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Users)
            .and_where(Expr::col(users::Column::Email).eq(ADMIN_EMAIL))
            .to_owned();

        manager.exec_stmt(delete).await?;

        Ok(())
    }
}
