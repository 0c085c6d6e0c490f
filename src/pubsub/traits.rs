// Pub/sub transport trait: the seam between the notification core and SNS.
//
// SnsClient implements it against the real service; tests substitute an
// in-process fake. Every call is one blocking round trip with no retries:
// a failure surfaces immediately as a transport error for that unit of work.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;

use super::filter::{FilterPolicy, SubscriptionHandle, SubscriptionRecord, SubscriptionState};

/// String-typed message attributes, keyed by attribute name.
pub type MessageAttributes = BTreeMap<String, String>;

/// What the transport returns for an accepted publish.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishResult {
    pub message_id: String,
}

#[async_trait]
pub trait PubSubTransport: Send + Sync {
    /// Every subscription on the topic (all pages).
    async fn list_subscriptions(&self, topic: &str) -> Result<Vec<SubscriptionRecord>>;

    /// Create an email subscription with the policy attached at creation.
    /// The transport sends a confirmation mail; the result is normally Pending.
    async fn subscribe(
        &self,
        topic: &str,
        endpoint: &str,
        policy: &FilterPolicy,
    ) -> Result<SubscriptionState>;

    /// Replace the filter policy of a confirmed subscription in place.
    async fn set_filter_policy(
        &self,
        handle: &SubscriptionHandle,
        policy: &FilterPolicy,
    ) -> Result<()>;

    /// Current filter policy of a confirmed subscription (`None` = no policy).
    async fn get_filter_policy(&self, handle: &SubscriptionHandle)
        -> Result<Option<FilterPolicy>>;

    /// Publish a message with string attributes.
    async fn publish(
        &self,
        topic: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<PublishResult>;
}
