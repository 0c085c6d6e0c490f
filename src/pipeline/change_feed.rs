// Change-event router: item inserts in, notifications out.
//
// Each batch from the item store's change feed is processed record by
// record, in delivery order. A record that fails (bad publish, listing
// error) is logged and counted, and the batch moves on. The response to
// the feed always reports zero failed items: retrying a whole batch for
// one transient publish failure would re-notify everyone else, so we take
// forward progress over guaranteed delivery.

use std::sync::Arc;

use anyhow::Result;
use aws_lambda_events::event::streams::DynamoDbEventResponse;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::items::models::LostItem;
use crate::items::stream::{EventName, Image, StreamEvent};
use crate::notify::{NotificationMessage, Notifier, GENERAL_CATEGORY, UNKNOWN};
use crate::pubsub::PubSubTransport;

/// How the router decides who gets a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Publish every insert with a category attribute and let the topic's
    /// filter policies pick recipients. Missing category becomes "General".
    FilterPolicy,
    /// List confirmed subscriptions and publish only when at least one
    /// filter policy accepts the category. A missing category matches any
    /// confirmed subscription.
    SubscriberScan,
    /// Publish (without attributes) only items in one fixed category, to a
    /// topic dedicated to that category. Missing category becomes "Unknown".
    FixedCategory(String),
}

impl DeliveryMode {
    /// Category used when an inserted item has none.
    pub fn category_fallback(&self) -> Option<&'static str> {
        match self {
            DeliveryMode::FilterPolicy => Some(GENERAL_CATEGORY),
            DeliveryMode::SubscriberScan => None,
            DeliveryMode::FixedCategory(_) => Some(UNKNOWN),
        }
    }
}

/// What happened to one insert record.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    Published { message_id: String },
    /// Nobody is interested; nothing was sent.
    Filtered,
}

/// Per-batch counters, logged at the end of every batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub received: usize,
    pub inserts: usize,
    /// Modify/remove/unknown records.
    pub ignored: usize,
    /// Inserts without a new image.
    pub skipped: usize,
    pub published: usize,
    pub filtered: usize,
    pub failed: usize,
}

impl BatchOutcome {
    /// The change-feed response. Failures are never reported back.
    pub fn into_response(self) -> DynamoDbEventResponse {
        DynamoDbEventResponse {
            batch_item_failures: Vec::new(),
        }
    }
}

pub struct ChangeEventRouter {
    transport: Arc<dyn PubSubTransport>,
    notifier: Notifier,
    topic: String,
    mode: DeliveryMode,
}

impl ChangeEventRouter {
    pub fn new(transport: Arc<dyn PubSubTransport>, topic: &str, mode: DeliveryMode) -> Self {
        Self {
            notifier: Notifier::new(Arc::clone(&transport)),
            transport,
            topic: topic.to_string(),
            mode,
        }
    }

    pub fn mode(&self) -> &DeliveryMode {
        &self.mode
    }

    /// Process one batch to completion.
    pub async fn handle_batch(&self, event: &StreamEvent) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for record in &event.records {
            outcome.received += 1;
            let id = record.identifier();
            debug!(record = id, event = ?record.event_name, "Processing record");

            if record.event_name != EventName::Insert {
                outcome.ignored += 1;
                continue;
            }
            let Some(image) = record.new_image() else {
                warn!(record = id, "Insert record without a new image, skipping");
                outcome.skipped += 1;
                continue;
            };
            outcome.inserts += 1;

            match self.route(image).await {
                Ok(Routed::Published { .. }) => outcome.published += 1,
                Ok(Routed::Filtered) => outcome.filtered += 1,
                Err(e) => {
                    error!(record = id, error = %format!("{e:#}"), "Failed to notify for record");
                    outcome.failed += 1;
                }
            }
        }

        info!(
            received = outcome.received,
            published = outcome.published,
            filtered = outcome.filtered,
            failed = outcome.failed,
            "Processed change-feed batch"
        );
        outcome
    }

    /// Decide and publish for one inserted item image.
    pub async fn route(&self, image: &Image) -> Result<Routed> {
        let item = LostItem::from_image(image);
        let message = NotificationMessage::from_item(&item, self.mode.category_fallback());
        let category = message.category.as_deref();

        let attribute = match &self.mode {
            DeliveryMode::FilterPolicy => category,
            DeliveryMode::SubscriberScan => {
                if !self.has_interested_subscriber(category).await? {
                    debug!(category = ?category, "No subscriber accepts this category");
                    return Ok(Routed::Filtered);
                }
                category
            }
            DeliveryMode::FixedCategory(wanted) => {
                if category != Some(wanted.as_str()) {
                    info!(
                        category = category.unwrap_or(UNKNOWN),
                        "Category does not match the specified category"
                    );
                    return Ok(Routed::Filtered);
                }
                None
            }
        };

        let result = self.notifier.publish(&message, &self.topic, attribute).await?;
        Ok(Routed::Published {
            message_id: result.message_id,
        })
    }

    /// True when any confirmed subscription's policy accepts `category`.
    /// An item without a category matches every confirmed subscription.
    async fn has_interested_subscriber(&self, category: Option<&str>) -> Result<bool> {
        let subscriptions = self.transport.list_subscriptions(&self.topic).await?;
        for sub in &subscriptions {
            let Some(handle) = sub.state.handle() else {
                continue;
            };
            if category.is_none() {
                return Ok(true);
            }
            let accepted = match self.transport.get_filter_policy(handle).await? {
                Some(policy) => policy.accepts(category),
                None => true,
            };
            if accepted {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
