// Identity provider and profile store traits.
//
// Implementors: CognitoClient (group membership) and DynamoProfileStore
// (profile records). Both are constructor-injected so the confirmation
// trigger and admin operations can run against fakes.

use anyhow::Result;
use async_trait::async_trait;

use crate::items::models::UserProfile;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Add `username` to `group` in the given pool.
    async fn add_user_to_group(&self, pool_id: &str, username: &str, group: &str) -> Result<()>;
}

/// Whether a profile write created a new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileWrite {
    Created,
    /// A profile for this owner already existed and was left untouched.
    AlreadyExists,
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create_profile(&self, profile: &UserProfile) -> Result<ProfileWrite>;
}
