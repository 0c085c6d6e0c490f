// Caller-facing error types.
//
// Internal plumbing (SDK calls, JSON) uses anyhow with context chains.
// Only the operations a caller can observe directly get a typed error here,
// so the invocation runtime can report a stable error type and message.

/// Failure of the subscribe operation.
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    /// Required input missing (e.g. no email). Not retried.
    #[error("{0}")]
    Validation(String),
    /// The transport could not complete the upsert. The cause is logged
    /// where it happens; callers only see the summary message.
    #[error("Failed to process subscription request")]
    Subscription(#[source] anyhow::Error),
}

impl SubscribeError {
    /// Stable error type name reported to the invoker.
    pub fn kind(&self) -> &'static str {
        match self {
            SubscribeError::Validation(_) => "ValidationError",
            SubscribeError::Subscription(_) => "SubscriptionError",
        }
    }
}

/// The transport rejected a single publish.
#[derive(Debug, thiserror::Error)]
#[error("failed to publish to {topic}")]
pub struct PublishError {
    pub topic: String,
    #[source]
    pub source: anyhow::Error,
}

/// Failure of the admin group-assignment operation.
#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    #[error("{0}")]
    Validation(String),
    #[error("Failed to add user to group")]
    Transport(#[source] anyhow::Error),
}

impl GroupError {
    pub fn kind(&self) -> &'static str {
        match self {
            GroupError::Validation(_) => "ValidationError",
            GroupError::Transport(_) => "TransportError",
        }
    }
}
