//! Authentication and authorization types

use serde::{Deserialize, Serialize};

/// Role granted to a signed-in operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// `GET /api/session` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCheck {
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

impl SessionCheck {
    pub fn role(&self) -> Role {
        if self.is_admin {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// `GET /api/profile` response; `message` carries the display name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub message: String,
}

/// Login request
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
