// Filter policies and subscription state.
//
// Persisted format: {"category": ["Electronics"]}. A single "*" or a
// missing key means every category. The transport evaluates these
// against the `category` message attribute; `accepts` mirrors that
// convention for the places that match locally.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The message attribute (and filter policy key) carrying the category.
pub const CATEGORY_ATTRIBUTE: &str = "category";

/// Wildcard entry meaning "receive all categories".
pub const WILDCARD: &str = "*";

/// Placeholder handle the transport reports for unconfirmed subscriptions.
pub const PENDING_CONFIRMATION: &str = "PendingConfirmation";

/// A subscription's category filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredPolicy")]
pub struct FilterPolicy {
    /// `None` means the key is absent (receive all).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<String>>,
}

/// Stored policy as read back. Older subscriptions used `Category`; when
/// both keys are present their values are merged.
#[derive(Deserialize)]
struct StoredPolicy {
    #[serde(default)]
    category: Option<Vec<String>>,
    #[serde(rename = "Category", default)]
    legacy_category: Option<Vec<String>>,
}

impl From<StoredPolicy> for FilterPolicy {
    fn from(stored: StoredPolicy) -> Self {
        let category = match (stored.category, stored.legacy_category) {
            (Some(mut values), Some(legacy)) => {
                for value in legacy {
                    if !values.contains(&value) {
                        values.push(value);
                    }
                }
                Some(values)
            }
            (values, legacy) => values.or(legacy),
        };
        Self { category }
    }
}

impl FilterPolicy {
    /// Policy for a subscriber's chosen category. Empty or blank means all.
    pub fn for_category(category: &str) -> Self {
        let category = category.trim();
        if category.is_empty() {
            Self::all()
        } else {
            Self {
                category: Some(vec![category.to_string()]),
            }
        }
    }

    /// The explicit receive-all policy: {"category": ["*"]}.
    pub fn all() -> Self {
        Self {
            category: Some(vec![WILDCARD.to_string()]),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        match &self.category {
            None => true,
            Some(values) => values.iter().any(|v| v == WILDCARD),
        }
    }

    /// Whether the transport would deliver a message with this category
    /// attribute. A message without the attribute only reaches wildcard
    /// subscribers.
    pub fn accepts(&self, category: Option<&str>) -> bool {
        if self.is_wildcard() {
            return true;
        }
        match (category, &self.category) {
            (Some(c), Some(values)) => values.iter().any(|v| v == c),
            _ => false,
        }
    }

    pub fn to_json(&self) -> String {
        // A struct of Option<Vec<String>> always serializes
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Parse a stored policy. Accepts the legacy capitalised `Category` key,
    /// alone or alongside `category`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).with_context(|| format!("Invalid filter policy: {json}"))
    }
}

/// Opaque handle of a confirmed subscription (an ARN on SNS).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(pub String);

impl SubscriptionHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether the endpoint owner has confirmed the subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionState {
    Pending,
    Confirmed(SubscriptionHandle),
}

impl SubscriptionState {
    /// Classify a raw handle reported by the transport.
    ///
    /// Absent, the pending placeholder (in either spelling SNS uses), or
    /// anything that is not structurally an ARN counts as pending.
    pub fn from_arn(arn: Option<&str>) -> Self {
        match arn {
            Some(arn) if is_arn(arn) => {
                SubscriptionState::Confirmed(SubscriptionHandle(arn.to_string()))
            }
            _ => SubscriptionState::Pending,
        }
    }

    pub fn handle(&self) -> Option<&SubscriptionHandle> {
        match self {
            SubscriptionState::Confirmed(handle) => Some(handle),
            SubscriptionState::Pending => None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, SubscriptionState::Confirmed(_))
    }
}

// arn:partition:service:region:account:resource
fn is_arn(value: &str) -> bool {
    value != PENDING_CONFIRMATION && value.starts_with("arn:") && value.split(':').count() >= 6
}

/// One subscription on a topic.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRecord {
    pub endpoint: String,
    pub protocol: String,
    pub state: SubscriptionState,
}
