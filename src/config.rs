use std::env;

use anyhow::Result;

/// Region used when AWS_REGION is not set.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Central configuration loaded from environment variables.
///
/// The Lambda environment injects these; for local runs the .env file
/// is loaded at startup via dotenvy. Each command checks only the
/// settings it actually uses (see the `require_*` methods).
#[derive(Debug, Clone)]
pub struct Config {
    /// General notification topic (subscribe + stream router).
    pub sns_topic_arn: String,
    /// Optional topic for the fixed-category router variant.
    pub category_topic_arn: Option<String>,
    /// Category forwarded by the fixed-category variant.
    pub specified_category: String,
    /// Group every confirmed account joins.
    pub default_group: String,
    /// Group that grants administrative access.
    pub admin_group: String,
    /// Identity pool used for admin group calls when the event has none.
    pub user_pool_id: String,
    /// Table holding user profile records.
    pub profile_table: String,
    /// AWS region for every service client.
    pub region: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nothing is required at load time; missing values surface when a
    /// command that needs them calls the matching `require_*` check.
    pub fn load() -> Result<Self> {
        Ok(Self {
            sns_topic_arn: env::var("SNS_TOPIC_ARN").unwrap_or_default(),
            category_topic_arn: env::var("CATEGORY_TOPIC_ARN")
                .ok()
                .filter(|arn| !arn.is_empty()),
            specified_category: env::var("SPECIFIED_CATEGORY")
                .unwrap_or_else(|_| "Unknown".to_string()),
            default_group: env::var("DEFAULT_GROUP").unwrap_or_else(|_| "User".to_string()),
            admin_group: env::var("ADMIN_GROUP").unwrap_or_else(|_| "Admin".to_string()),
            user_pool_id: env::var("USER_POOL_ID").unwrap_or_default(),
            profile_table: env::var("PROFILE_TABLE").unwrap_or_default(),
            region: env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
        })
    }

    /// Check that the general notification topic is configured.
    pub fn require_topic(&self) -> Result<&str> {
        if self.sns_topic_arn.is_empty() {
            anyhow::bail!(
                "SNS_TOPIC_ARN is not set in the environment variables.\n\
                 Point it at the notification topic before subscribing or routing."
            );
        }
        Ok(&self.sns_topic_arn)
    }

    /// The topic used by the fixed-category variant. Falls back to the
    /// general topic when no dedicated category topic is configured.
    pub fn require_category_topic(&self) -> Result<&str> {
        match self.category_topic_arn.as_deref() {
            Some(arn) => Ok(arn),
            None => self.require_topic(),
        }
    }

    /// Check that an identity pool id is available for admin group calls.
    pub fn require_user_pool(&self) -> Result<&str> {
        if self.user_pool_id.is_empty() {
            anyhow::bail!("USER_POOL_ID not set. Admin group assignment needs the pool id.");
        }
        Ok(&self.user_pool_id)
    }

    /// Check that the profile table is configured.
    pub fn require_profile_table(&self) -> Result<&str> {
        if self.profile_table.is_empty() {
            anyhow::bail!("PROFILE_TABLE not set. Profile records cannot be created.");
        }
        Ok(&self.profile_table)
    }

    /// Groups an administrator may assign.
    pub fn assignable_groups(&self) -> Vec<String> {
        vec![self.default_group.clone(), self.admin_group.clone()]
    }
}
