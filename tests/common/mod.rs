// In-process fakes for the transport, identity and profile seams.
//
// FakeTopic behaves like the real topic where it matters: subscribe creates
// a pending entry, `confirm` turns it into an ARN, listing reports pending
// ones with the placeholder, and filter policies decide deliveries.

#![allow(dead_code)]

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use lostfound::identity::{IdentityProvider, ProfileStore, ProfileWrite};
use lostfound::items::models::UserProfile;
use lostfound::pubsub::filter::{CATEGORY_ATTRIBUTE, PENDING_CONFIRMATION};
use lostfound::pubsub::{
    FilterPolicy, MessageAttributes, PubSubTransport, PublishResult, SubscriptionHandle,
    SubscriptionRecord, SubscriptionState,
};

pub const TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:lost-items";

#[derive(Debug, Clone)]
pub struct FakeSubscription {
    pub endpoint: String,
    pub arn: Option<String>,
    pub policy: FilterPolicy,
}

#[derive(Debug, Clone)]
pub struct Published {
    pub topic: String,
    pub body: String,
    pub attributes: MessageAttributes,
}

#[derive(Default)]
struct TopicState {
    subscriptions: Vec<FakeSubscription>,
    published: Vec<Published>,
    publish_attempts: usize,
    next_id: usize,
}

#[derive(Default)]
pub struct FakeTopic {
    state: Mutex<TopicState>,
    /// Publishing a body containing this text fails.
    pub fail_publish_containing: Option<String>,
    pub fail_listing: bool,
}

impl FakeTopic {
    pub fn new() -> Self {
        Self::default()
    }

    /// A topic whose subscription listing always fails.
    pub fn failing_listing() -> Self {
        Self {
            fail_listing: true,
            ..Self::default()
        }
    }

    /// A topic that rejects publishes whose body contains `needle`.
    pub fn failing_publish(needle: &str) -> Self {
        Self {
            fail_publish_containing: Some(needle.to_string()),
            ..Self::default()
        }
    }

    /// Simulate the endpoint owner clicking the confirmation link on
    /// their pending subscription.
    pub fn confirm(&self, endpoint: &str) {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        if let Some(sub) = state
            .subscriptions
            .iter_mut()
            .find(|s| s.endpoint == endpoint && s.arn.is_none())
        {
            sub.arn = Some(format!("{TOPIC}:sub-{id}"));
        }
    }

    pub fn subscriptions_for(&self, endpoint: &str) -> Vec<FakeSubscription> {
        let state = self.state.lock().unwrap();
        state
            .subscriptions
            .iter()
            .filter(|s| s.endpoint == endpoint)
            .cloned()
            .collect()
    }

    pub fn published(&self) -> Vec<Published> {
        self.state.lock().unwrap().published.clone()
    }

    pub fn publish_attempts(&self) -> usize {
        self.state.lock().unwrap().publish_attempts
    }

    /// Confirmed endpoints the topic would deliver `message` to.
    pub fn recipients(&self, message: &Published) -> Vec<String> {
        let category = message.attributes.get(CATEGORY_ATTRIBUTE).map(String::as_str);
        let state = self.state.lock().unwrap();
        state
            .subscriptions
            .iter()
            .filter(|s| s.arn.is_some() && s.policy.accepts(category))
            .map(|s| s.endpoint.clone())
            .collect()
    }
}

#[async_trait]
impl PubSubTransport for FakeTopic {
    async fn list_subscriptions(&self, _topic: &str) -> Result<Vec<SubscriptionRecord>> {
        if self.fail_listing {
            anyhow::bail!("ListSubscriptionsByTopic: throttled");
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .subscriptions
            .iter()
            .map(|s| SubscriptionRecord {
                endpoint: s.endpoint.clone(),
                protocol: "email".to_string(),
                state: SubscriptionState::from_arn(Some(
                    s.arn.as_deref().unwrap_or(PENDING_CONFIRMATION),
                )),
            })
            .collect())
    }

    async fn subscribe(
        &self,
        _topic: &str,
        endpoint: &str,
        policy: &FilterPolicy,
    ) -> Result<SubscriptionState> {
        let mut state = self.state.lock().unwrap();
        state.subscriptions.push(FakeSubscription {
            endpoint: endpoint.to_string(),
            arn: None,
            policy: policy.clone(),
        });
        Ok(SubscriptionState::from_arn(Some("pending confirmation")))
    }

    async fn set_filter_policy(
        &self,
        handle: &SubscriptionHandle,
        policy: &FilterPolicy,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let sub = state
            .subscriptions
            .iter_mut()
            .find(|s| s.arn.as_deref() == Some(handle.as_str()))
            .ok_or_else(|| anyhow::anyhow!("NotFound: {handle}"))?;
        sub.policy = policy.clone();
        Ok(())
    }

    async fn get_filter_policy(
        &self,
        handle: &SubscriptionHandle,
    ) -> Result<Option<FilterPolicy>> {
        let state = self.state.lock().unwrap();
        state
            .subscriptions
            .iter()
            .find(|s| s.arn.as_deref() == Some(handle.as_str()))
            .map(|s| Some(s.policy.clone()))
            .ok_or_else(|| anyhow::anyhow!("NotFound: {handle}"))
    }

    async fn publish(
        &self,
        topic: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<PublishResult> {
        let mut state = self.state.lock().unwrap();
        state.publish_attempts += 1;
        if let Some(needle) = &self.fail_publish_containing {
            if body.contains(needle.as_str()) {
                anyhow::bail!("Publish rejected: InternalError");
            }
        }
        state.published.push(Published {
            topic: topic.to_string(),
            body: body.to_string(),
            attributes: attributes.clone(),
        });
        Ok(PublishResult {
            message_id: format!("msg-{}", state.published.len()),
        })
    }
}

/// Identity provider that records calls and can be told to fail.
#[derive(Default)]
pub struct FakeIdentity {
    pub fail: bool,
    pub calls: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn add_user_to_group(&self, pool_id: &str, username: &str, group: &str) -> Result<()> {
        self.calls.lock().unwrap().push((
            pool_id.to_string(),
            username.to_string(),
            group.to_string(),
        ));
        if self.fail {
            anyhow::bail!("AccessDeniedException");
        }
        Ok(())
    }
}

/// Profile store that records writes and can be told to fail.
#[derive(Default)]
pub struct FakeProfiles {
    pub fail: bool,
    pub created: Mutex<Vec<UserProfile>>,
}

#[async_trait]
impl ProfileStore for FakeProfiles {
    async fn create_profile(&self, profile: &UserProfile) -> Result<ProfileWrite> {
        if self.fail {
            anyhow::bail!("ProvisionedThroughputExceededException");
        }
        let mut created = self.created.lock().unwrap();
        if created.iter().any(|p| p.profile_owner == profile.profile_owner) {
            return Ok(ProfileWrite::AlreadyExists);
        }
        created.push(profile.clone());
        Ok(ProfileWrite::Created)
    }
}
