//! Request handler trait.

use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;

use crate::types::Message;

/// Handlers fail with any error; the bus normalizes it before replying.
pub type HandlerError = anyhow::Error;

pub type HandlerResult = Result<Value, HandlerError>;

/// Handles requests for one routing key.
///
/// Handlers receive the full request so they can inspect `source` and
/// `tabId` as well as the payload.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, request: Message) -> HandlerResult;
}

#[async_trait]
impl<F, Fut> MessageHandler for F
where
    F: Fn(Message) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn handle(&self, request: Message) -> HandlerResult {
        (self)(request).await
    }
}
