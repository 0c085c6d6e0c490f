// Group-assignment trigger: runs once when an account is confirmed.
//
// Two independent best-effort steps: join the default group, then create
// the profile record. Either may fail without affecting the other, and the
// trigger always completes, because the identity provider will not finish
// confirming the account until it does.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::identity::{IdentityProvider, ProfileStore, ProfileWrite};
use crate::items::models::UserProfile;

/// Trigger source for a password reset confirmation; not a new account.
pub const FORGOT_PASSWORD_SOURCE: &str = "PostConfirmation_ConfirmForgotPassword";

/// The parts of the identity provider's confirmation event we read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostConfirmationEvent {
    #[serde(default)]
    pub user_pool_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub trigger_source: Option<String>,
    #[serde(default)]
    pub request: ConfirmationRequest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    #[serde(default)]
    pub user_attributes: HashMap<String, String>,
}

/// Which side effects succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationOutcome {
    pub group_assigned: bool,
    pub profile_created: bool,
}

pub struct GroupAssignmentTrigger {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    default_group: String,
}

impl GroupAssignmentTrigger {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        default_group: &str,
    ) -> Self {
        Self {
            identity,
            profiles,
            default_group: default_group.to_string(),
        }
    }

    /// Run both side effects. Never fails; the outcome records what worked.
    pub async fn on_confirmed(&self, event: &PostConfirmationEvent) -> ConfirmationOutcome {
        let mut outcome = ConfirmationOutcome::default();

        if event.trigger_source.as_deref() == Some(FORGOT_PASSWORD_SOURCE) {
            info!(username = %event.user_name, "Password reset confirmation, nothing to provision");
            return outcome;
        }

        match self.assign_group(event).await {
            Ok(()) => {
                info!(username = %event.user_name, group = %self.default_group, "User added to group");
                outcome.group_assigned = true;
            }
            Err(e) => error!(
                username = %event.user_name,
                error = %format!("{e:#}"),
                "Error adding user to group"
            ),
        }

        match self.create_profile(event).await {
            Ok(write) => {
                info!(username = %event.user_name, write = ?write, "UserProfile provisioned");
                outcome.profile_created = true;
            }
            Err(e) => error!(
                username = %event.user_name,
                error = %format!("{e:#}"),
                "Error creating UserProfile"
            ),
        }

        outcome
    }

    async fn assign_group(&self, event: &PostConfirmationEvent) -> Result<()> {
        if event.user_pool_id.is_empty() || event.user_name.is_empty() {
            anyhow::bail!("Confirmation event is missing the pool id or username");
        }
        self.identity
            .add_user_to_group(&event.user_pool_id, &event.user_name, &self.default_group)
            .await
    }

    async fn create_profile(&self, event: &PostConfirmationEvent) -> Result<ProfileWrite> {
        let attributes = &event.request.user_attributes;
        let subject = attributes
            .get("sub")
            .context("Confirmation event has no `sub` attribute")?;
        let email = attributes
            .get("email")
            .context("Confirmation event has no `email` attribute")?;

        let profile = UserProfile::new(subject, &event.user_name, email);
        self.profiles.create_profile(&profile).await
    }
}
