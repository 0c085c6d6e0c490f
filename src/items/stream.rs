// Change-feed wire types: the batch the item store's stream delivers.
//
// Records carry DynamoDB-typed attribute values ({"S": "Wallet"},
// {"BOOL": true}, ...). Only INSERT records are acted on; everything we do
// not recognise deserializes rather than failing the whole batch.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    M(HashMap<String, AttributeValue>),
    L(Vec<AttributeValue>),
    SS(Vec<String>),
    NS(Vec<String>),
    B(String),
    BS(Vec<String>),
}

/// A record image: field name to typed value.
pub type Image = HashMap<String, AttributeValue>;

/// Non-empty string field of an image.
pub fn string_attr(image: &Image, key: &str) -> Option<String> {
    match image.get(key) {
        Some(AttributeValue::S(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Boolean field of an image.
pub fn bool_attr(image: &Image, key: &str) -> Option<bool> {
    match image.get(key) {
        Some(AttributeValue::Bool(b)) => Some(*b),
        _ => None,
    }
}

/// The operation a change record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventName {
    Insert,
    Modify,
    Remove,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A batch delivered by the change feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<StreamRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamRecord {
    #[serde(rename = "eventID", default)]
    pub event_id: Option<String>,
    #[serde(rename = "eventName", default)]
    pub event_name: EventName,
    #[serde(default)]
    pub dynamodb: Option<StreamPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamPayload {
    #[serde(rename = "Keys", default)]
    pub keys: Option<Image>,
    #[serde(rename = "NewImage", default)]
    pub new_image: Option<Image>,
    #[serde(rename = "SequenceNumber", default)]
    pub sequence_number: Option<String>,
}

impl StreamRecord {
    /// The record's new image, if it carries one.
    pub fn new_image(&self) -> Option<&Image> {
        self.dynamodb.as_ref()?.new_image.as_ref()
    }

    /// Identifier used in logs and in batch failure reports.
    pub fn identifier(&self) -> &str {
        self.dynamodb
            .as_ref()
            .and_then(|d| d.sequence_number.as_deref())
            .or(self.event_id.as_deref())
            .unwrap_or("unknown")
    }
}
