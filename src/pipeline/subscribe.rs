// Subscription manager: idempotent create-or-update of a subscriber's
// category filter on the notification topic.
//
// list -> find confirmed entry for the email -> update its policy in place,
// or create a new (pending) subscription with the policy attached.
//
// Known limitation: two concurrent first-time subscribes for the same
// email can both see "no confirmed subscription" and both create one.
// The transport serializes its own mutations; nothing here locks.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::error::SubscribeError;
use crate::pubsub::{FilterPolicy, PubSubTransport, SubscriptionHandle, SubscriptionState};

/// Which path the upsert took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// New subscription requested; the endpoint owner must confirm by email.
    Created { state: SubscriptionState },
    /// Existing confirmed subscription had its filter replaced.
    Updated { handle: SubscriptionHandle },
}

impl SubscribeOutcome {
    /// What to tell the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            SubscribeOutcome::Created { .. } => {
                "Subscription requested. Please verify your email to start receiving notifications."
            }
            SubscribeOutcome::Updated { .. } => "Subscription updated.",
        }
    }
}

pub struct SubscriptionManager {
    transport: Arc<dyn PubSubTransport>,
    topic: String,
}

impl SubscriptionManager {
    pub fn new(transport: Arc<dyn PubSubTransport>, topic: &str) -> Self {
        Self {
            transport,
            topic: topic.to_string(),
        }
    }

    /// Subscribe `email` to `category` (empty = all categories).
    pub async fn subscribe(
        &self,
        email: &str,
        category: &str,
    ) -> Result<SubscribeOutcome, SubscribeError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(SubscribeError::Validation(
                "Email is required for subscription.".to_string(),
            ));
        }

        let policy = FilterPolicy::for_category(category);
        info!(email = %email, policy = %policy.to_json(), "Subscription request");

        self.upsert(email, &policy).await.map_err(|e| {
            error!(email = %email, error = %format!("{e:#}"), "Subscription error");
            SubscribeError::Subscription(e)
        })
    }

    async fn upsert(&self, email: &str, policy: &FilterPolicy) -> Result<SubscribeOutcome> {
        let subscriptions = self.transport.list_subscriptions(&self.topic).await?;

        let mut confirmed = subscriptions
            .iter()
            .filter(|s| s.endpoint == email)
            .filter_map(|s| s.state.handle());
        let existing = confirmed.next().cloned();
        if confirmed.next().is_some() {
            warn!(email = %email, "Multiple confirmed subscriptions for endpoint, updating the first");
        }

        match existing {
            Some(handle) => {
                self.transport.set_filter_policy(&handle, policy).await?;
                info!(email = %email, subscription = %handle, "Updated filter policy for existing subscription");
                Ok(SubscribeOutcome::Updated { handle })
            }
            None => {
                info!(email = %email, "No confirmed subscription found, creating a new one");
                let state = self.transport.subscribe(&self.topic, email, policy).await?;
                info!(email = %email, "Subscription confirmation sent");
                Ok(SubscribeOutcome::Created { state })
            }
        }
    }
}
