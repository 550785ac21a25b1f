use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::ProfilePatch;

/// Full user row. Only the login and password-change flows load this;
/// everything else works on [`UserProfile`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub photo: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Projection that never selects the password hash. This is what the auth
/// gate resolves and what profile endpoints return.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
}

/// Minimal listing entry for the user directory.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserName {
    pub id: Uuid,
    pub name: String,
}

impl User {
    /// Exact, case-sensitive email match.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, photo, department, phone, bio, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, photo, department, phone, bio, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. The caller has already hashed the password.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, photo, department, phone, bio, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn set_password_hash(
        db: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name,
            email: self.email,
            photo: self.photo,
            department: self.department,
            phone: self.phone,
            bio: self.bio,
        }
    }
}

impl UserProfile {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, name, email, photo, department, phone, bio
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    /// Overwrite only the fields present in the patch; omitted fields keep
    /// their current value. Email is deliberately not updatable here.
    /// Last write wins between concurrent patches.
    pub async fn apply_patch(
        db: &PgPool,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> anyhow::Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                photo = COALESCE($4, photo),
                bio = COALESCE($5, bio),
                department = COALESCE($6, department)
            WHERE id = $1
            RETURNING id, name, email, photo, department, phone, bio
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.phone)
        .bind(&patch.photo)
        .bind(&patch.bio)
        .bind(&patch.department)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }
}

impl UserName {
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<UserName>> {
        let rows = sqlx::query_as::<_, UserName>("SELECT id, name FROM users")
            .fetch_all(db)
            .await?;
        Ok(rows)
    }
}
