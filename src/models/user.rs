use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Authorization level of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    /// Also what any unrecognized stored role reads as.
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

pub const DEFAULT_STATUS: &str = "active";

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// Identity stored in the `users` collection, keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_status")]
    pub status: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Sign-up body. Profile fields beyond the email are stored as sent,
/// except the ones the server owns.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    #[serde(flatten)]
    pub profile: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminCheckResponse {
    pub admin: bool,
}

#[derive(Debug, Serialize)]
pub struct UserStatusResponse {
    pub status: String,
    pub role: Role,
}
