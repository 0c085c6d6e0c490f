// DynamoProfileStore: writes UserProfile records straight to the table.
//
// The record id is the profile owner key, and the put is conditional on
// that id not existing yet. A replayed confirmation therefore never
// clobbers a profile the user has since edited.

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::{SecondsFormat, Utc};
use tracing::debug;

use super::traits::{ProfileStore, ProfileWrite};
use crate::items::models::UserProfile;

/// Record type name the data layer stamps on each row.
const TYPENAME: &str = "UserProfile";

pub struct DynamoProfileStore {
    client: Client,
    table: String,
}

impl DynamoProfileStore {
    pub fn new(client: Client, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
        }
    }
}

#[async_trait]
impl ProfileStore for DynamoProfileStore {
    async fn create_profile(&self, profile: &UserProfile) -> Result<ProfileWrite> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let owner = AttributeValue::S(profile.profile_owner.clone());

        debug!(owner = %profile.profile_owner, table = %self.table, "PutItem profile");

        let result = self
            .client
            .put_item()
            .table_name(&self.table)
            .item("id", owner.clone())
            .item("profileOwner", owner)
            .item("email", AttributeValue::S(profile.email.clone()))
            .item("__typename", AttributeValue::S(TYPENAME.to_string()))
            .item("createdAt", AttributeValue::S(now.clone()))
            .item("updatedAt", AttributeValue::S(now))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(ProfileWrite::Created),
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                Ok(ProfileWrite::AlreadyExists)
            }
            Err(e) => Err(anyhow::anyhow!(
                "Failed to create profile for {}: {}",
                profile.profile_owner,
                DisplayErrorContext(e)
            )),
        }
    }
}
