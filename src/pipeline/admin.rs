// Admin group promotion: add an existing user to a named group.
//
// Only the configured groups (default + admin) can be assigned.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info};

use crate::error::GroupError;
use crate::identity::IdentityProvider;

/// Arguments of the add-user-to-group call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteArgs {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub group_name: String,
}

pub struct GroupAdmin {
    identity: Arc<dyn IdentityProvider>,
    pool_id: String,
    groups: Vec<String>,
}

impl GroupAdmin {
    pub fn new(identity: Arc<dyn IdentityProvider>, pool_id: &str, groups: Vec<String>) -> Self {
        Self {
            identity,
            pool_id: pool_id.to_string(),
            groups,
        }
    }

    pub async fn promote(&self, user_id: &str, group: &str) -> Result<(), GroupError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(GroupError::Validation("User id is required.".to_string()));
        }
        if !self.groups.iter().any(|g| g == group) {
            return Err(GroupError::Validation(format!(
                "Unknown group {group:?}. Expected one of: {}",
                self.groups.join(", ")
            )));
        }

        self.identity
            .add_user_to_group(&self.pool_id, user_id, group)
            .await
            .map_err(|e| {
                error!(user = %user_id, group = %group, error = %format!("{e:#}"), "Group assignment failed");
                GroupError::Transport(e)
            })?;

        info!(user = %user_id, group = %group, "User added to group");
        Ok(())
    }
}
