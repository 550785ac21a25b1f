use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{auth::claims::Claims, state::AppState};

/// Holds signing and verification keys for session tokens. Built from the
/// configured secret; startup already failed if the secret was absent.
#[derive(Clone)]
pub struct TokenKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> Self {
        let auth = &state.config.auth;
        Self {
            encoding: EncodingKey::from_secret(auth.secret.as_bytes()),
            decoding: DecodingKey::from_secret(auth.secret.as_bytes()),
            ttl: Duration::from_secs((auth.token_ttl_hours as u64) * 3600),
        }
    }
}

impl TokenKeys {
    /// Sign a token for `user_id`, expiring `ttl` (24h by default) from now.
    pub fn issue(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "session token issued");
        Ok(token)
    }

    /// Check signature and expiry. Zero leeway: a token is valid only while
    /// now < exp. The error carries no detail a caller could use to tell
    /// a bad signature from an expired token.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "session token verified");
        Ok(data.claims)
    }
}
