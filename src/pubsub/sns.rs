// SNS implementation of PubSubTransport, over the AWS SDK client.
//
// SDK errors are flattened into anyhow with DisplayErrorContext so the
// service error code and message survive into the logs.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::types::MessageAttributeValue;
use aws_sdk_sns::Client;
use tracing::debug;

use super::filter::{
    FilterPolicy, SubscriptionHandle, SubscriptionRecord, SubscriptionState, CATEGORY_ATTRIBUTE,
};
use super::traits::{MessageAttributes, PubSubTransport, PublishResult};

/// Protocol used for every subscription this system creates.
pub const EMAIL_PROTOCOL: &str = "email";

/// Subscription attribute holding the filter policy.
const FILTER_POLICY_ATTRIBUTE: &str = "FilterPolicy";

fn sns_error(action: &str, err: impl std::error::Error) -> anyhow::Error {
    anyhow::anyhow!("SNS {action} failed: {}", DisplayErrorContext(err))
}

pub struct SnsClient {
    client: Client,
}

impl SnsClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PubSubTransport for SnsClient {
    async fn list_subscriptions(&self, topic: &str) -> Result<Vec<SubscriptionRecord>> {
        let mut records = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_subscriptions_by_topic()
                .topic_arn(topic)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| sns_error("ListSubscriptionsByTopic", e))?;

            records.extend(page.subscriptions().iter().map(|s| SubscriptionRecord {
                endpoint: s.endpoint().unwrap_or_default().to_string(),
                protocol: s.protocol().unwrap_or_default().to_string(),
                state: SubscriptionState::from_arn(s.subscription_arn()),
            }));

            match page.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(topic = topic, count = records.len(), "Listed subscriptions");
        Ok(records)
    }

    async fn subscribe(
        &self,
        topic: &str,
        endpoint: &str,
        policy: &FilterPolicy,
    ) -> Result<SubscriptionState> {
        let output = self
            .client
            .subscribe()
            .topic_arn(topic)
            .protocol(EMAIL_PROTOCOL)
            .endpoint(endpoint)
            .attributes(FILTER_POLICY_ATTRIBUTE, policy.to_json())
            .send()
            .await
            .map_err(|e| sns_error("Subscribe", e))?;
        Ok(SubscriptionState::from_arn(output.subscription_arn()))
    }

    async fn set_filter_policy(
        &self,
        handle: &SubscriptionHandle,
        policy: &FilterPolicy,
    ) -> Result<()> {
        self.client
            .set_subscription_attributes()
            .subscription_arn(handle.as_str())
            .attribute_name(FILTER_POLICY_ATTRIBUTE)
            .attribute_value(policy.to_json())
            .send()
            .await
            .map_err(|e| sns_error("SetSubscriptionAttributes", e))?;
        Ok(())
    }

    async fn get_filter_policy(
        &self,
        handle: &SubscriptionHandle,
    ) -> Result<Option<FilterPolicy>> {
        let output = self
            .client
            .get_subscription_attributes()
            .subscription_arn(handle.as_str())
            .send()
            .await
            .map_err(|e| sns_error("GetSubscriptionAttributes", e))?;

        match output.attributes().and_then(|a| a.get(FILTER_POLICY_ATTRIBUTE)) {
            Some(json) if !json.is_empty() => FilterPolicy::from_json(json).map(Some),
            _ => Ok(None),
        }
    }

    async fn publish(
        &self,
        topic: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<PublishResult> {
        let mut message_attributes = HashMap::new();
        for (name, value) in attributes {
            let value = MessageAttributeValue::builder()
                .data_type("String")
                .string_value(value)
                .build()
                .with_context(|| format!("Invalid message attribute {name}"))?;
            message_attributes.insert(name.clone(), value);
        }

        let output = self
            .client
            .publish()
            .topic_arn(topic)
            .message(body)
            .set_message_attributes(Some(message_attributes).filter(|m| !m.is_empty()))
            .send()
            .await
            .map_err(|e| sns_error("Publish", e))?;

        let message_id = output.message_id().unwrap_or_default().to_string();
        debug!(
            topic = topic,
            message_id = %message_id,
            category = ?attributes.get(CATEGORY_ATTRIBUTE),
            "Published"
        );
        Ok(PublishResult { message_id })
    }
}
