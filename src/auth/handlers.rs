use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        cookie::{clear_session_cookie, session_cookie, SESSION_COOKIE},
        dto::{AuthResponse, LoginRequest, ProfilePatch, RegisterRequest, UpdatePasswordRequest},
        extractors::CurrentUser,
        password::{hash_password, verify_password},
        repo::{User, UserName, UserProfile},
        token::TokenKeys,
    },
    error::ApiError,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/logout", get(logout))
        .route("/users/getuser", get(get_user))
        .route("/users/getusers", get(get_users))
        .route("/users/loginstatus", get(login_status))
        .route("/users/updateuser", patch(update_user))
        .route("/users/updatepassword", patch(update_password))
}

/// Presence check: an absent field and an empty string are both "missing".
fn filled(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Passwords must have more than 8 characters.
fn password_meets_policy(password: &str) -> bool {
    password.len() > 8
}

/// Verify the password and only then mint a token. A failed login returns
/// before any token exists, so it can never leave a usable session behind.
fn establish_session(keys: &TokenKeys, user: &User, password: &str) -> Result<String, ApiError> {
    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::Validation("Invalid user data".into()));
    }
    Ok(keys.issue(user.id)?)
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    let (Some(name), Some(email), Some(password)) = (
        filled(payload.name),
        filled(payload.email),
        filled(payload.password),
    ) else {
        return Err(ApiError::Validation(
            "Please fill in all required fields".into(),
        ));
    };

    if !password_meets_policy(&password) {
        return Err(ApiError::Validation(
            "Password must have more than 8 characters".into(),
        ));
    }

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("Email is already used".into()));
    }

    // Hashing is an explicit step here; the store never sees the plaintext
    let hash = hash_password(&password)?;
    let user = User::create(&state.db, &name, &email, &hash).await?;

    let keys = TokenKeys::from_ref(&state);
    let token = keys.issue(user.id)?;
    let jar = jar.add(session_cookie(token.clone()));

    info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            user: user.into_profile(),
            token,
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let (Some(email), Some(password)) = (filled(payload.email), filled(payload.password)) else {
        return Err(ApiError::Validation("Please add email and password".into()));
    };

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| {
            warn!(email = %email, "login for unregistered email");
            ApiError::Validation("User is not registered".into())
        })?;

    let keys = TokenKeys::from_ref(&state);
    let token = establish_session(&keys, &user, &password)?;
    let jar = jar.add(session_cookie(token.clone()));

    info!(user_id = %user.id, "user logged in");
    Ok((
        jar,
        Json(AuthResponse {
            user: user.into_profile(),
            token,
        }),
    ))
}

/// Clears the cookie unconditionally; no store access. The token itself
/// stays cryptographically valid until its expiry.
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.add(clear_session_cookie());
    (jar, Json(json!({ "message": "Logout successful" })))
}

#[instrument(skip(state, user))]
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = UserProfile::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| ApiError::Validation("User not found".into()))?;
    Ok(Json(profile))
}

#[instrument(skip(state, _user))]
pub async fn get_users(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<UserName>>, ApiError> {
    let users = UserName::list_all(&state.db).await?;
    Ok(Json(users))
}

/// True iff a verifiable session cookie came with the request. Never errors.
#[instrument(skip(state, jar))]
pub async fn login_status(State(state): State<AppState>, jar: CookieJar) -> Json<bool> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Json(false);
    };
    let keys = TokenKeys::from_ref(&state);
    Json(keys.verify(cookie.value()).is_ok())
}

#[instrument(skip(state, user, patch))]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<UserProfile>, ApiError> {
    let updated = UserProfile::apply_patch(&state.db, user.id, &patch)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    info!(user_id = %user.id, "profile updated");
    Ok(Json(updated))
}

#[instrument(skip(state, user, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let stored = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| ApiError::Validation("User not found".into()))?;

    let (Some(old_password), Some(new_password)) = (
        filled(payload.old_password),
        filled(payload.new_password),
    ) else {
        return Err(ApiError::Validation("Passwords have to be filled".into()));
    };

    if !verify_password(&old_password, &stored.password_hash)? {
        warn!(user_id = %user.id, "password change with wrong old password");
        return Err(ApiError::Validation("Password is incorrect".into()));
    }

    let hash = hash_password(&new_password)?;
    User::set_password_hash(&state.db, user.id, &hash).await?;

    info!(user_id = %user.id, "password changed");
    Ok(Json(json!({ "message": "Password is changed" })))
}
