use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE},
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    pkg::{
        internal::auth::{ResetCode, Role, Session, User, hash_password, verify_password},
        server::{middlewares::authn::SESSION_COOKIE, state::AppState},
    },
    prelude::{Error, Result, field_error},
};

#[derive(Deserialize, Validate)]
pub struct SignupInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub role: String,
    pub college_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordInput {
    pub email: String,
}

#[derive(Deserialize, Validate)]
pub struct ResetPasswordInput {
    pub email: String,
    pub code: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub new_password: String,
}

fn session_response(user: User, session: &Session) -> Result<(HeaderMap, Json<Value>)> {
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        HeaderValue::from_str(&format!(
            "{}={}; Path=/; HttpOnly; Secure",
            SESSION_COOKIE, session.token
        ))?,
    );
    let body = json!({"token": session.token, "user": user});
    Ok((headers, Json(body)))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupInput>,
) -> Result<(StatusCode, (HeaderMap, Json<Value>))> {
    input.validate()?;
    let role = match input.role.as_str() {
        "student" => Role::Student,
        "admin" => Role::Admin,
        _ => return Err(field_error("role", "role must be student or admin")),
    };
    if role == Role::Student && input.college_id.is_none() {
        return Err(field_error("college_id", "students must belong to a college"));
    }
    let password_hash = hash_password(&input.password)?;
    let user = User::create(
        &state,
        &input.name,
        &input.email,
        &password_hash,
        role,
        input.college_id,
    )
    .await?;
    let session = Session::issue(&state, user.id).await?;
    tracing::info!("user {} signed up", user.id);
    Ok((StatusCode::CREATED, session_response(user, &session)?))
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<(HeaderMap, Json<Value>)> {
    let Some((user, stored_hash)) = User::with_credentials(&state, &input.email).await? else {
        return Err(Error::Unauthenticated);
    };
    if !verify_password(&input.password, &stored_hash)? {
        tracing::warn!("failed login attempt for user {}", user.id);
        return Err(Error::Unauthenticated);
    }
    let session = Session::issue(&state, user.id).await?;
    session_response(user, &session)
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Json<Value>> {
    Session::revoke_for_user(&state, user.id).await?;
    tracing::info!("user {} logged out successfully", &user.name);
    Ok(Json(json!({"success": true})))
}

/// Always answers success: whether the email exists is not disclosed.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(input): Json<ForgotPasswordInput>,
) -> Result<Json<Value>> {
    if let Some(user) = User::retrieve(&state, &input.email).await? {
        ResetCode::issue(&state, &user).await?;
    } else {
        tracing::debug!("password reset requested for unknown email");
    }
    Ok(Json(json!({"success": true})))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordInput>,
) -> Result<Json<Value>> {
    input.validate()?;
    let Some(user) = User::retrieve(&state, &input.email).await? else {
        // same error as a wrong code, so the flow leaks nothing
        return Err(field_error("code", "invalid or expired reset code"));
    };
    ResetCode::redeem(&state, user.id, &input.code).await?;
    let password_hash = hash_password(&input.new_password)?;
    User::set_password(&state, user.id, &password_hash).await?;
    Session::revoke_for_user(&state, user.id).await?;
    tracing::info!("password reset for user {}", user.id);
    Ok(Json(json!({"success": true})))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(role: &str, college_id: Option<Uuid>) -> SignupInput {
        SignupInput {
            name: "Asha".into(),
            email: "asha@example.edu".into(),
            password: "correct horse battery".into(),
            role: role.into(),
            college_id,
        }
    }

    #[test]
    fn signup_input_rules() {
        assert!(signup("student", Some(Uuid::new_v4())).validate().is_ok());

        let bad_email = SignupInput {
            email: "not-an-email".into(),
            ..signup("student", Some(Uuid::new_v4()))
        };
        assert!(bad_email.validate().is_err());

        let short_password = SignupInput {
            password: "short".into(),
            ..signup("student", Some(Uuid::new_v4()))
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn reset_password_requires_a_real_password() {
        let input = ResetPasswordInput {
            email: "asha@example.edu".into(),
            code: "123456".into(),
            new_password: "short".into(),
        };
        assert!(input.validate().is_err());
    }
}
