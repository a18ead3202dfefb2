use serde::{Deserialize, Serialize};

/// Dashboard roles, ordered from least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Viewer,
    Reviewer,
    Admin,
}

impl UserRole {
    pub fn allows(&self, required: UserRole) -> bool {
        *self >= required
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Viewer => write!(f, "viewer"),
            UserRole::Reviewer => write!(f, "reviewer"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

/// The signed-in user as reported by the identity service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: String,
    pub email: String,
    pub role: UserRole,
}
