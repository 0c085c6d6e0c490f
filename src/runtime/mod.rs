// Invocation runtime: handlers served through lambda_runtime.
//
// lambda_runtime owns the poll/respond loop and answers every request id,
// including payloads that fail to deserialize. Each invocation gets its
// own span; nothing crosses invocations except the handler and its clients.

pub mod handlers;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use lambda_runtime::{service_fn, Diagnostic, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, info_span, Instrument};

use crate::error::{GroupError, SubscribeError};

/// A handler for one kind of invocation payload.
#[async_trait]
pub trait InvocationHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn invoke(&self, payload: Value) -> Result<Value>;
}

/// Error document reported for a failed invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationError {
    pub error_message: String,
    pub error_type: String,
}

impl InvocationError {
    /// Caller-facing errors keep their own type name and summary message;
    /// anything else is reported as unhandled.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let error_type = if let Some(e) = err.downcast_ref::<SubscribeError>() {
            e.kind()
        } else if let Some(e) = err.downcast_ref::<GroupError>() {
            e.kind()
        } else {
            "Unhandled"
        };
        Self {
            error_message: err.to_string(),
            error_type: error_type.to_string(),
        }
    }
}

impl From<InvocationError> for Diagnostic {
    fn from(err: InvocationError) -> Self {
        Diagnostic {
            error_type: err.error_type,
            error_message: err.error_message,
        }
    }
}

/// Run one payload through `handler` inside an invocation span.
pub async fn dispatch(
    handler: &dyn InvocationHandler,
    request_id: &str,
    payload: Value,
) -> Result<Value, InvocationError> {
    let span = info_span!("invocation", request_id = %request_id, handler = handler.name());

    async {
        handler.invoke(payload).await.map_err(|e| {
            error!(error = %format!("{e:#}"), "Invocation failed");
            InvocationError::from_anyhow(&e)
        })
    }
    .instrument(span)
    .await
}

/// Serve invocations until the runtime shuts the process down.
pub async fn serve(handler: Arc<dyn InvocationHandler>) -> Result<()> {
    info!(handler = handler.name(), "Runtime loop started");

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = Arc::clone(&handler);
        async move {
            dispatch(handler.as_ref(), &event.context.request_id, event.payload)
                .await
                .map_err(Diagnostic::from)
        }
    }))
    .await
    .map_err(|e| anyhow::anyhow!("Lambda runtime stopped: {e}"))
}
