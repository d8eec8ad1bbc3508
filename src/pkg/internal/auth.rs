use crate::{
    conf::settings,
    pkg::{
        internal::email::{SendEmail, resetcode::ResetCodeTemplate},
        server::state::AppState,
    },
    prelude::{Error, Result, field_error},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

#[derive(Debug, Type)]
#[sqlx(type_name = "reset_status", rename_all = "lowercase")]
pub enum ResetStatus {
    Pending,
    Used,
    Expired,
}

/// Resolved identity for a request. Never built from client-supplied
/// fields; always re-read from the store via the session credential.
#[derive(FromRow, Serialize, Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub college_id: Option<Uuid>,
}

#[derive(FromRow, Debug)]
pub struct Session {
    pub token: Uuid,
    pub user_id: Uuid,
    pub expiry: DateTime<Utc>,
    pub revoked: bool,
}

#[derive(FromRow, Debug)]
struct UserWithHash {
    id: Uuid,
    name: String,
    email: String,
    role: Role,
    college_id: Option<Uuid>,
    password_hash: String,
}

impl User {
    /// The college an admin manages. Job mutation is scoped to it.
    pub fn require_admin(&self) -> Result<Uuid> {
        match (self.role, self.college_id) {
            (Role::Admin, Some(college_id)) => Ok(college_id),
            (Role::Admin, None) => Err(Error::Forbidden("admin has no college scope")),
            _ => Err(Error::Forbidden("admin role required")),
        }
    }

    pub fn college(&self) -> Result<Uuid> {
        self.college_id
            .ok_or(Error::Forbidden("no college assigned"))
    }

    pub async fn create(
        state: &AppState,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        college_id: Option<Uuid>,
    ) -> Result<Self> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role, college_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, role, college_id
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(college_id)
        .fetch_one(&*state.db_pool)
        .await;
        match row {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(field_error("email", "email already registered"))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn retrieve(state: &AppState, email: &str) -> Result<Option<Self>> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, college_id FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&*state.db_pool)
        .await?)
    }

    /// Login path: identity plus the stored hash, in one read.
    pub async fn with_credentials(state: &AppState, email: &str) -> Result<Option<(Self, String)>> {
        let row = sqlx::query_as::<_, UserWithHash>(
            "SELECT id, name, email, role, college_id, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&*state.db_pool)
        .await?;
        Ok(row.map(|r| {
            (
                User {
                    id: r.id,
                    name: r.name,
                    email: r.email,
                    role: r.role,
                    college_id: r.college_id,
                },
                r.password_hash,
            )
        }))
    }

    pub async fn set_password(state: &AppState, user_id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&*state.db_pool)
            .await?;
        Ok(())
    }

    /// Platform-wide admin headcount, used by the landing widget only.
    pub async fn admin_count(state: &AppState) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
                .fetch_one(&*state.db_pool)
                .await?;
        Ok(count)
    }
}

impl Session {
    pub async fn issue(state: &AppState, user_id: Uuid) -> Result<Self> {
        let expiry = Utc::now() + Duration::hours(settings.session_ttl_hours);
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, expiry)
            VALUES ($1, $2)
            RETURNING token, user_id, expiry, revoked
            "#,
        )
        .bind(user_id)
        .bind(expiry)
        .fetch_one(&*state.db_pool)
        .await?;
        tracing::debug!("session issued for user {}", user_id);
        Ok(session)
    }

    /// Maps a bearer credential to the user behind it. Anything short of a
    /// live, unrevoked session resolves to `Unauthenticated`.
    pub async fn resolve(state: &AppState, credential: &str) -> Result<User> {
        let token = credential
            .parse::<Uuid>()
            .map_err(|_| Error::Unauthenticated)?;
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT token, user_id, expiry, revoked FROM sessions
            WHERE token = $1 AND NOT revoked AND expiry > now()
            "#,
        )
        .bind(token)
        .fetch_optional(&*state.db_pool)
        .await?;
        let Some(session) = session else {
            return Err(Error::Unauthenticated);
        };
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, college_id FROM users WHERE id = $1",
        )
        .bind(session.user_id)
        .fetch_optional(&*state.db_pool)
        .await?;
        user.ok_or(Error::NotFound("user"))
    }

    pub async fn revoke_for_user(state: &AppState, user_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE sessions SET revoked = true WHERE user_id = $1 AND NOT revoked")
            .bind(user_id)
            .execute(&*state.db_pool)
            .await?;
        Ok(())
    }
}

pub struct ResetCode;

impl ResetCode {
    fn generate_code() -> String {
        let mut rng = rand::rng();
        (0..6).map(|_| rng.random_range(0..10).to_string()).collect()
    }

    /// Issues a fresh reset code, superseding any pending one, and mails it.
    pub async fn issue(state: &AppState, user: &User) -> Result<()> {
        let code = Self::generate_code();
        tracing::debug!("issued reset code for user {}", user.id);
        sqlx::query("UPDATE reset_codes SET status = $2 WHERE user_id = $1 AND status = $3")
            .bind(user.id)
            .bind(ResetStatus::Expired)
            .bind(ResetStatus::Pending)
            .execute(&*state.db_pool)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO reset_codes (user_id, code, expiry)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user.id)
        .bind(&code)
        .bind(Utc::now() + Duration::minutes(settings.reset_code_ttl_minutes))
        .execute(&*state.db_pool)
        .await?;
        ResetCodeTemplate {
            name: &user.name,
            code: &code,
        }
        .send(&user.email)?;
        Ok(())
    }

    /// Consumes a pending, unexpired code. Wrong or stale codes all surface
    /// as the same field error so the flow leaks nothing.
    pub async fn redeem(state: &AppState, user_id: Uuid, code: &str) -> Result<()> {
        let redeemed = sqlx::query(
            r#"
            UPDATE reset_codes SET status = $3
            WHERE user_id = $1 AND code = $2 AND status = $4 AND expiry > now()
            "#,
        )
        .bind(user_id)
        .bind(code)
        .bind(ResetStatus::Used)
        .bind(ResetStatus::Pending)
        .execute(&*state.db_pool)
        .await?;
        if redeemed.rows_affected() == 0 {
            return Err(field_error("code", "invalid or expired reset code"));
        }
        Ok(())
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let parsed =
        PasswordHash::new(stored).map_err(|e| Error::Internal(format!("bad stored hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, college_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Asha".into(),
            email: "asha@example.edu".into(),
            role,
            college_id,
        }
    }

    #[test]
    fn admin_scope_requires_admin_role_and_college() {
        let college = Uuid::new_v4();
        assert_eq!(
            user(Role::Admin, Some(college)).require_admin().unwrap(),
            college
        );
        assert!(user(Role::Student, Some(college)).require_admin().is_err());
        assert!(user(Role::Admin, None).require_admin().is_err());
    }

    #[test]
    fn students_without_a_college_are_rejected() {
        assert!(user(Role::Student, None).college().is_err());
        let college = Uuid::new_v4();
        assert_eq!(
            user(Role::Student, Some(college)).college().unwrap(),
            college
        );
    }

    #[test]
    fn reset_codes_are_six_digits() {
        for _ in 0..32 {
            let code = ResetCode::generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }
}
