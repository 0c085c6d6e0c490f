// InvocationHandler implementations, one per deployed function.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::InvocationHandler;
use crate::error::SubscribeError;
use crate::items::stream::StreamEvent;
use crate::pipeline::admin::{GroupAdmin, PromoteArgs};
use crate::pipeline::change_feed::ChangeEventRouter;
use crate::pipeline::confirmation::{GroupAssignmentTrigger, PostConfirmationEvent};
use crate::pipeline::subscribe::SubscriptionManager;

/// Resolver calls wrap their input in `arguments`; direct calls don't.
fn arguments(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) if map.contains_key("arguments") => {
            map.remove("arguments").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Change-feed batches.
pub struct StreamHandler {
    pub router: ChangeEventRouter,
}

#[async_trait]
impl InvocationHandler for StreamHandler {
    fn name(&self) -> &'static str {
        "stream"
    }

    async fn invoke(&self, payload: Value) -> Result<Value> {
        let event: StreamEvent =
            serde_json::from_value(payload).context("Payload is not a change-feed batch")?;
        let outcome = self.router.handle_batch(&event).await;
        Ok(serde_json::to_value(outcome.into_response())?)
    }
}

/// Subscribe input: `{ email, category }`. Anything other than a string
/// (or an absent/null value) is a validation error, not a crash.
#[derive(Debug, Default, PartialEq)]
pub struct SubscribeArgs {
    pub email: String,
    pub category: String,
}

impl SubscribeArgs {
    pub fn from_value(args: &Value) -> Result<Self, SubscribeError> {
        if !(args.is_object() || args.is_null()) {
            return Err(SubscribeError::Validation(
                "Subscription arguments must be an object.".to_string(),
            ));
        }
        Ok(Self {
            email: string_arg(args, "email")?,
            category: string_arg(args, "category")?,
        })
    }
}

fn string_arg(args: &Value, key: &str) -> Result<String, SubscribeError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(SubscribeError::Validation(format!(
            "Field `{key}` must be a string, got {other}."
        ))),
    }
}

/// The subscribe RPC. Answers `null`; errors carry the user-facing message.
pub struct SubscribeHandler {
    pub manager: SubscriptionManager,
}

#[async_trait]
impl InvocationHandler for SubscribeHandler {
    fn name(&self) -> &'static str {
        "subscribe"
    }

    async fn invoke(&self, payload: Value) -> Result<Value> {
        let args = SubscribeArgs::from_value(&arguments(payload))?;
        self.manager.subscribe(&args.email, &args.category).await?;
        Ok(Value::Null)
    }
}

/// Account confirmation. Always echoes the event back.
pub struct ConfirmationHandler {
    pub trigger: GroupAssignmentTrigger,
}

#[async_trait]
impl InvocationHandler for ConfirmationHandler {
    fn name(&self) -> &'static str {
        "post-confirmation"
    }

    async fn invoke(&self, payload: Value) -> Result<Value> {
        match serde_json::from_value::<PostConfirmationEvent>(payload.clone()) {
            Ok(event) => {
                self.trigger.on_confirmed(&event).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Unreadable confirmation event, skipping side effects");
            }
        }
        Ok(payload)
    }
}

/// Admin group promotion.
pub struct PromoteHandler {
    pub admin: GroupAdmin,
}

#[async_trait]
impl InvocationHandler for PromoteHandler {
    fn name(&self) -> &'static str {
        "add-user-to-group"
    }

    async fn invoke(&self, payload: Value) -> Result<Value> {
        let args: PromoteArgs = serde_json::from_value(arguments(payload))
            .context("Invalid add-user-to-group arguments")?;
        self.admin.promote(&args.user_id, &args.group_name).await?;
        Ok(serde_json::json!({
            "userId": args.user_id,
            "groupName": args.group_name,
        }))
    }
}
