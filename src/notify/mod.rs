// Notifier: formats a new-item notification and publishes it.
//
// The body is for the human reader only. Routing happens on the `category`
// message attribute, which the topic's filter policies inspect.

use std::sync::Arc;

use tracing::info;

use crate::error::PublishError;
use crate::items::models::LostItem;
use crate::pubsub::filter::CATEGORY_ATTRIBUTE;
use crate::pubsub::{MessageAttributes, PubSubTransport, PublishResult};

/// Placeholder for missing string fields.
pub const UNKNOWN: &str = "Unknown";

/// Category fallback when the item has none (filter-policy delivery).
pub const GENERAL_CATEGORY: &str = "General";

/// One notification, built per inserted item.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationMessage {
    pub name: String,
    pub location: String,
    pub date: String,
    /// `None` means "matches every subscriber".
    pub category: Option<String>,
}

impl NotificationMessage {
    /// Build from an item, filling missing strings with "Unknown" and a
    /// missing category with `fallback`.
    pub fn from_item(item: &LostItem, category_fallback: Option<&str>) -> Self {
        let or_unknown = |v: &Option<String>| v.clone().unwrap_or_else(|| UNKNOWN.to_string());
        Self {
            name: or_unknown(&item.name),
            location: or_unknown(&item.location),
            date: or_unknown(&item.date),
            category: item
                .category
                .clone()
                .or_else(|| category_fallback.map(str::to_string)),
        }
    }

    /// Human-readable body.
    pub fn body(&self) -> String {
        format!(
            "🔔 New Lost Item Found!\n📌 Name: {}\n📍 Location: {}\n📅 Date: {}\n📂 Category: {}",
            self.name,
            self.location,
            self.date,
            self.category.as_deref().unwrap_or("Any"),
        )
    }
}

/// Publishes notifications to a topic.
#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn PubSubTransport>,
}

impl Notifier {
    pub fn new(transport: Arc<dyn PubSubTransport>) -> Self {
        Self { transport }
    }

    /// Publish `message` to `topic`. When `category` is given it is attached
    /// as the string attribute the filter policies match on.
    pub async fn publish(
        &self,
        message: &NotificationMessage,
        topic: &str,
        category: Option<&str>,
    ) -> Result<PublishResult, PublishError> {
        let mut attributes = MessageAttributes::new();
        if let Some(category) = category {
            attributes.insert(CATEGORY_ATTRIBUTE.to_string(), category.to_string());
        }

        let result = self
            .transport
            .publish(topic, &message.body(), &attributes)
            .await
            .map_err(|source| PublishError {
                topic: topic.to_string(),
                source,
            })?;

        info!(
            message_id = %result.message_id,
            name = %message.name,
            category = category.unwrap_or("-"),
            "Notification published"
        );
        Ok(result)
    }
}
