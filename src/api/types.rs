//! Wire types for the account endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard response wrapper: `{"message": ..., "result": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub message: String,
    pub result: T,
}

/// Body of an error response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Response carrying only a message.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Customer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Customer => "customer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    #[serde(rename = "zipCode")]
    pub zip_code: String,
}

/// Account profile as returned by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    pub role: Role,
    /// 0 = unverified, 1 = verified, 2 = banned.
    #[serde(default)]
    pub verify: u8,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl User {
    pub fn is_verified(&self) -> bool {
        self.verify == 1
    }

    pub fn is_banned(&self) -> bool {
        self.verify == 2
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResult {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub date_of_birth: String,
    pub address: Address,
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
    pub user: RegisteredUser,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct OtpRequest<'a> {
    pub email: &'a str,
    pub code: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct EmailRequest<'a> {
    pub email: &'a str,
}

/// Partial profile update; unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_envelope() {
        let json = r#"{
            "message": "Login success",
            "result": {
                "access_token": "tok",
                "user": {
                    "_id": "u1", "name": "Mai", "email": "mai@example.com",
                    "username": "mai", "role": "staff", "verify": 1, "avatar": "",
                    "created_at": "2025-01-01T00:00:00Z", "updated_at": "2025-01-02T00:00:00Z",
                    "address": {
                        "street": "1 Le Loi", "city": "HCMC", "state": "",
                        "country": "VN", "zipCode": "700000"
                    }
                }
            }
        }"#;

        let envelope: Envelope<LoginResult> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.message, "Login success");
        assert_eq!(envelope.result.access_token, "tok");
        let user = envelope.result.user;
        assert_eq!(user.role, Role::Staff);
        assert!(user.is_verified());
        assert_eq!(user.address.unwrap().zip_code, "700000");
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = UpdateProfileRequest {
            bio: Some("Door staff".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"bio": "Door staff"}));
    }
}
