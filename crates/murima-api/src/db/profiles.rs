//! Profile persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `profiles` table.
//! Role is stored as its lowercase string form.

use chrono::{DateTime, Utc};
use murima_core::{Email, Phone, Profile, Role, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use super::decode_err;

/// Insert the profile row created at registration.
pub async fn insert(pool: &PgPool, profile: &Profile) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO profiles (id, username, full_name, email, phone, avatar_url, bio, role, is_verified, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(profile.id.as_uuid())
    .bind(&profile.username)
    .bind(&profile.full_name)
    .bind(profile.email.as_str())
    .bind(profile.phone.as_ref().map(Phone::as_str))
    .bind(&profile.avatar_url)
    .bind(&profile.bio)
    .bind(profile.role.as_str())
    .bind(profile.is_verified)
    .bind(profile.created_at)
    .bind(profile.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Overwrite the mutable columns of a profile row.
pub async fn update(pool: &PgPool, profile: &Profile) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE profiles SET username = $1, full_name = $2, phone = $3, avatar_url = $4,
         bio = $5, role = $6, is_verified = $7, updated_at = $8 WHERE id = $9",
    )
    .bind(&profile.username)
    .bind(&profile.full_name)
    .bind(profile.phone.as_ref().map(Phone::as_str))
    .bind(&profile.avatar_url)
    .bind(&profile.bio)
    .bind(profile.role.as_str())
    .bind(profile.is_verified)
    .bind(profile.updated_at)
    .bind(profile.id.as_uuid())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all profiles into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Profile>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProfileRow>(
        "SELECT id, username, full_name, email, phone, avatar_url, bio, role, is_verified, created_at, updated_at
         FROM profiles ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ProfileRow::into_record).collect()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    username: Option<String>,
    full_name: String,
    email: String,
    phone: Option<String>,
    avatar_url: Option<String>,
    bio: Option<String>,
    role: String,
    is_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_record(self) -> Result<Profile, sqlx::Error> {
        let email = Email::new(self.email).map_err(|e| decode_err("profile email", e))?;
        let phone = match self.phone {
            Some(raw) => Some(Phone::new(raw).map_err(|e| decode_err("profile phone", e))?),
            None => None,
        };
        let role = Role::parse(&self.role).unwrap_or_else(|| {
            tracing::warn!(
                id = %self.id,
                role = %self.role,
                "unknown role in database, defaulting to user"
            );
            Role::User
        });

        Ok(Profile {
            id: UserId::from_uuid(self.id),
            username: self.username,
            full_name: self.full_name,
            email,
            phone,
            avatar_url: self.avatar_url,
            bio: self.bio,
            role,
            is_verified: self.is_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
