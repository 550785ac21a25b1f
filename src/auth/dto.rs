use serde::{Deserialize, Serialize};

use crate::auth::repo::UserProfile;

/// Request body for registration. Presence of each field is checked in the
/// handler so a missing field is a 400, not a deserialization error.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Explicit patch: `None` means "omitted, keep the current value";
/// `Some(v)` means "set to v", even when v is the empty string. Email is
/// not part of the patch.
#[derive(Debug, Default, Deserialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<String>,
    pub bio: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    pub old_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

/// Returned by register and login: the public profile plus the token that
/// was also attached as a cookie.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: UserProfile,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn patch_distinguishes_omitted_from_empty() {
        let patch: ProfilePatch = serde_json::from_str(r#"{"bio": "x", "phone": ""}"#).unwrap();
        assert_eq!(patch.bio.as_deref(), Some("x"));
        assert_eq!(patch.phone.as_deref(), Some(""));
        assert!(patch.name.is_none());
        assert!(patch.photo.is_none());
        assert!(patch.department.is_none());
    }

    #[test]
    fn register_request_tolerates_missing_fields() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email": "a@b.c"}"#).unwrap();
        assert_eq!(req.email.as_deref(), Some("a@b.c"));
        assert!(req.name.is_none());
        assert!(req.password.is_none());
    }

    #[test]
    fn update_password_uses_camel_case_keys() {
        let req: UpdatePasswordRequest =
            serde_json::from_str(r#"{"oldPassword": "old", "newPassword": "new"}"#).unwrap();
        assert_eq!(req.old_password.as_deref(), Some("old"));
        assert_eq!(req.new_password.as_deref(), Some("new"));
    }

    #[test]
    fn auth_response_flattens_profile_next_to_token() {
        let response = AuthResponse {
            user: UserProfile {
                id: Uuid::new_v4(),
                name: "Dana".into(),
                email: "dana@example.com".into(),
                photo: None,
                department: None,
                phone: None,
                bio: None,
            },
            token: "signed".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&response).unwrap();
        assert_eq!(json["email"], "dana@example.com");
        assert_eq!(json["token"], "signed");
        assert!(json.get("user").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
