pub mod static_provider;

use async_trait::async_trait;

use crate::domain::error::Result;
use crate::domain::session::{UserRole, UserSession};

pub use static_provider::StaticSessionProvider;

/// Identity/session service seen through its contract
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Resolve a bearer token to the signed-in user, if any
    async fn current_user(&self, token: &str) -> Result<Option<UserSession>>;

    /// Look up the current role of a user
    async fn role_of(&self, user_id: &str) -> Result<UserRole>;
}
