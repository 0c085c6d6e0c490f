// Cognito user pool client: only the admin group-membership call.

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::error::DisplayErrorContext;
use aws_sdk_cognitoidentityprovider::Client;
use tracing::debug;

use super::traits::IdentityProvider;

pub struct CognitoClient {
    client: Client,
}

impl CognitoClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityProvider for CognitoClient {
    async fn add_user_to_group(&self, pool_id: &str, username: &str, group: &str) -> Result<()> {
        debug!(username = username, group = group, "AdminAddUserToGroup");

        self.client
            .admin_add_user_to_group()
            .user_pool_id(pool_id)
            .username(username)
            .group_name(group)
            .send()
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to add {username} to group {group}: {}",
                    DisplayErrorContext(e)
                )
            })?;
        Ok(())
    }
}
