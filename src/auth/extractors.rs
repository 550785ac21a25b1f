use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use tracing::warn;

use crate::{
    auth::{cookie::SESSION_COOKIE, repo::UserProfile, token::TokenKeys},
    error::ApiError,
    state::AppState,
};

/// The auth gate. Extracts the session cookie, verifies the token, resolves
/// the user (password hash excluded from the projection) and hands the
/// identity to the handler as an explicit parameter.
///
/// Every failure — no cookie, bad or expired token, user deleted since the
/// token was issued — rejects with the same [`ApiError::Unauthenticated`],
/// so the response never reveals which step failed.
pub struct CurrentUser(pub UserProfile);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_owned())
            .ok_or(ApiError::Unauthenticated)?;

        let keys = TokenKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|_| {
            warn!("invalid or expired session token");
            ApiError::Unauthenticated
        })?;

        // A verified token for a deleted user is treated exactly like no token
        let user = UserProfile::find_by_id(&state.db, claims.sub)
            .await
            .map_err(|_| ApiError::Unauthenticated)?
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "session token for unknown user");
                ApiError::Unauthenticated
            })?;

        Ok(CurrentUser(user))
    }
}
