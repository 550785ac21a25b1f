use axum_extra::extract::cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};

/// Name of the session cookie carrying the signed token.
pub const SESSION_COOKIE: &str = "token";

const SESSION_TTL: Duration = Duration::days(1);

/// Cookie sent on register/login. HTTP-only so page scripts cannot read it,
/// SameSite=None + Secure so a cross-site frontend can use it over HTTPS.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::None)
        .secure(true)
        .max_age(SESSION_TTL)
        .build()
}

/// Cookie sent on logout: same name, empty value, already expired. The
/// client drops its copy immediately; the token itself is not revoked.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::None)
        .secure(true)
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_has_required_attributes() {
        let cookie = session_cookie("signed.token.value".into());
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "signed.token.value");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(86400)));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie();
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        let expires = cookie.expires_datetime().expect("expiry set");
        assert!(expires < OffsetDateTime::now_utc());
    }
}
