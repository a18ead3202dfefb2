use std::sync::Arc;

use tracing::warn;

use crate::domain::error::{AppError, Result};
use crate::domain::session::{UserRole, UserSession};
use crate::infrastructure::session::SessionProvider;

/// Resolves bearer tokens and enforces the minimum role of an operation
pub struct AccessGuard {
    sessions: Arc<dyn SessionProvider>,
}

impl AccessGuard {
    pub fn new(sessions: Arc<dyn SessionProvider>) -> Self {
        Self { sessions }
    }

    /// The role is re-read from the provider so a demoted user loses access
    /// without signing out.
    pub async fn authorize(&self, token: Option<&str>, required: UserRole) -> Result<UserSession> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        let mut session = self
            .sessions
            .current_user(token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Unknown or expired session".to_string()))?;

        session.role = self.sessions.role_of(&session.user_id).await?;

        if !session.role.allows(required) {
            warn!(
                user_id = %session.user_id,
                role = %session.role,
                required = %required,
                "Access denied"
            );
            return Err(AppError::Forbidden(format!(
                "Role {} is required for this action",
                required
            )));
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::SessionSeed;
    use crate::infrastructure::session::StaticSessionProvider;

    fn guard() -> AccessGuard {
        let seeds = vec![
            SessionSeed {
                token: "viewer-token".to_string(),
                user_id: "u-viewer".to_string(),
                email: "viewer@example.org".to_string(),
                role: UserRole::Viewer,
            },
            SessionSeed {
                token: "admin-token".to_string(),
                user_id: "u-admin".to_string(),
                email: "admin@example.org".to_string(),
                role: UserRole::Admin,
            },
        ];
        AccessGuard::new(Arc::new(StaticSessionProvider::new(&seeds)))
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let result = guard().authorize(None, UserRole::Viewer).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));

        let result = guard().authorize(Some("  "), UserRole::Viewer).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let result = guard().authorize(Some("nope-nope"), UserRole::Viewer).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_role_gating() {
        let guard = guard();

        let viewer = guard.authorize(Some("viewer-token"), UserRole::Viewer).await.unwrap();
        assert_eq!(viewer.user_id, "u-viewer");

        let denied = guard.authorize(Some("viewer-token"), UserRole::Admin).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        let admin = guard.authorize(Some("admin-token"), UserRole::Reviewer).await.unwrap();
        assert_eq!(admin.role, UserRole::Admin);
    }
}
