use std::collections::HashMap;

use async_trait::async_trait;

use super::SessionProvider;
use crate::domain::error::{AppError, Result};
use crate::domain::session::{UserRole, UserSession};
use crate::infrastructure::config::SessionSeed;

/// Session provider backed by a fixed token table, for development and tests
pub struct StaticSessionProvider {
    by_token: HashMap<String, UserSession>,
}

impl StaticSessionProvider {
    pub fn new(seeds: &[SessionSeed]) -> Self {
        let by_token = seeds
            .iter()
            .map(|seed| {
                (
                    seed.token.clone(),
                    UserSession {
                        user_id: seed.user_id.clone(),
                        email: seed.email.clone(),
                        role: seed.role,
                    },
                )
            })
            .collect();
        Self { by_token }
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn current_user(&self, token: &str) -> Result<Option<UserSession>> {
        Ok(self.by_token.get(token).cloned())
    }

    async fn role_of(&self, user_id: &str) -> Result<UserRole> {
        self.by_token
            .values()
            .find(|session| session.user_id == user_id)
            .map(|session| session.role)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> StaticSessionProvider {
        StaticSessionProvider::new(&[SessionSeed {
            token: "tok-admin".to_string(),
            user_id: "u-1".to_string(),
            email: "admin@example.org".to_string(),
            role: UserRole::Admin,
        }])
    }

    #[tokio::test]
    async fn test_resolves_known_token() {
        let session = provider().current_user("tok-admin").await.unwrap().unwrap();
        assert_eq!(session.user_id, "u-1");
        assert!(provider().current_user("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_role_lookup() {
        assert_eq!(provider().role_of("u-1").await.unwrap(), UserRole::Admin);
        assert!(provider().role_of("u-404").await.is_err());
    }
}
