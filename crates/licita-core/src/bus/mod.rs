//! Message bus.
//!
//! One bus exists per context. It correlates outbound requests with their
//! responses, dispatches inbound requests to registered handlers, and
//! republishes inbound events on the context's local [`EventEmitter`].

mod dispatch;
mod options;

pub use options::{BusConfig, EventOptions, SendOptions};

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::{debug, info, trace, warn};

use licita_protocols::{
    Destination, HandlerError, HandlerResult, Message, MessageHandler, MessageId, MessagingError,
    Route, RouteKey, Source,
};

use crate::event::{EventEmitter, Subscription};
use crate::pending::PendingRequests;
use crate::registry::HandlerRegistry;

use dispatch::BusSink;

/// Number of answered request ids remembered for duplicate suppression.
const HANDLED_CAPACITY: usize = 1024;

#[derive(Default)]
struct HandledRequests {
    order: VecDeque<MessageId>,
    ids: HashSet<MessageId>,
}

impl HandledRequests {
    /// Record `id`; returns `false` if it was already recorded.
    fn first_time(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        if self.order.len() >= HANDLED_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
        self.order.push_back(id.to_string());
        self.ids.insert(id.to_string());
        true
    }
}

struct BusInner {
    source: Source,
    transport: Arc<dyn licita_protocols::Transport>,
    handlers: HandlerRegistry,
    pending: PendingRequests,
    events: EventEmitter,
    handled: Mutex<HandledRequests>,
    initialized: AtomicBool,
    debug: AtomicBool,
    config: BusConfig,
}

/// Messaging endpoint of one context.
///
/// Cloning is cheap; clones share handlers, pending requests and events.
#[derive(Clone)]
pub struct MessageBus {
    inner: Arc<BusInner>,
}

impl MessageBus {
    pub fn new(source: Source, transport: Arc<dyn licita_protocols::Transport>) -> Self {
        Self::with_config(source, transport, BusConfig::default())
    }

    pub fn with_config(
        source: Source,
        transport: Arc<dyn licita_protocols::Transport>,
        config: BusConfig,
    ) -> Self {
        Self {
            inner: Arc::new(BusInner {
                source,
                transport,
                handlers: HandlerRegistry::new(),
                pending: PendingRequests::new(),
                events: EventEmitter::new(),
                handled: Mutex::new(HandledRequests::default()),
                initialized: AtomicBool::new(false),
                debug: AtomicBool::new(config.debug),
                config,
            }),
        }
    }

    pub fn source(&self) -> Source {
        self.inner.source
    }

    /// A handle that does not keep the bus alive. Handlers that call back
    /// into their own bus hold one of these.
    pub fn downgrade(&self) -> WeakMessageBus {
        WeakMessageBus {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Start listening on the transport. Later calls do nothing.
    pub fn init(&self) -> Result<(), MessagingError> {
        if self.inner.initialized.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let sink = Arc::new(BusSink::new(Arc::downgrade(&self.inner)));
        if let Err(e) = self.inner.transport.listen(sink) {
            self.inner.initialized.store(false, Ordering::Release);
            return Err(e.into());
        }

        info!("Message bus initialized for {}", self.inner.source);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::Acquire)
    }

    /// Toggle verbose traffic logging.
    pub fn set_debug(&self, enabled: bool) {
        self.inner.debug.store(enabled, Ordering::Release);
        debug!("Message bus debug for {} set to {}", self.inner.source, enabled);
    }

    pub fn is_debug(&self) -> bool {
        self.inner.debug.load(Ordering::Acquire)
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.inner.handlers
    }

    pub fn events(&self) -> &EventEmitter {
        &self.inner.events
    }

    /// Number of requests still waiting for an outcome.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    pub fn register_handler(&self, key: impl Into<RouteKey>, handler: Arc<dyn MessageHandler>) {
        self.inner.handlers.register(key.into(), handler);
    }

    /// Register an async closure as the handler for `key`.
    pub fn register_fn<F, Fut>(&self, key: impl Into<RouteKey>, handler: F)
    where
        F: Fn(Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register_handler(key, Arc::new(handler));
    }

    /// Register a typed handler for route `R`.
    ///
    /// The request payload is decoded before the handler runs; a payload
    /// that does not match `R::Request` is answered with `INVALID_DATA`.
    pub fn register_route<R, F, Fut>(&self, _route: R, handler: F)
    where
        R: Route,
        F: Fn(R::Request, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R::Response, HandlerError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        self.register_fn(R::key(), move |request: Message| {
            let handler = handler.clone();
            async move {
                let payload = R::decode_request(request.payload())?;
                let response = handler(payload, request).await?;
                Ok(R::encode_response(&response)?)
            }
        });
    }

    pub fn unregister_handler(&self, key: impl Into<RouteKey>) -> bool {
        self.inner.handlers.unregister(&key.into())
    }

    /// Send a request and wait for its response payload.
    ///
    /// Only timeouts are retried; each retry is a new request with a fresh
    /// id and a fresh timer. The caller sees a single final outcome.
    pub async fn send_request(
        &self,
        key: impl Into<RouteKey>,
        payload: Option<Value>,
        options: SendOptions,
    ) -> Result<Value, MessagingError> {
        let route = key.into();
        let timeout = options.timeout.unwrap_or(self.inner.config.default_timeout);
        let mut remaining = options.retries.unwrap_or(self.inner.config.default_retries);

        loop {
            let message = Message::request(
                self.inner.source,
                &route,
                payload.clone(),
                options.tab_id(),
                Some(timeout.as_millis() as u64),
            );

            match self.send_once(message, options.destination, timeout).await {
                Err(err) if err.is_retryable() && remaining > 0 => {
                    self.log_debug(format!(
                        "Request timed out, retrying ({} attempts left)",
                        remaining
                    ));
                    remaining -= 1;
                }
                outcome => return outcome,
            }
        }
    }

    /// Send a typed request for route `R`.
    ///
    /// A response payload that does not match `R::Response` fails with
    /// `DATA_PARSING_ERROR`.
    pub async fn request<R: Route>(
        &self,
        _route: R,
        request: R::Request,
        options: SendOptions,
    ) -> Result<R::Response, MessagingError> {
        let payload = R::encode_request(&request)?;
        let value = self.send_request(R::key(), payload, options).await?;
        R::decode_response(value)
    }

    async fn send_once(
        &self,
        message: Message,
        destination: Destination,
        timeout: Duration,
    ) -> Result<Value, MessagingError> {
        let id = message.id.clone();
        let rx = self.inner.pending.insert(id.clone(), message.route());
        self.log_traffic("Sending", &message);

        let exchange = async {
            let report = match self.inner.transport.deliver(&message, destination).await {
                Ok(report) => report,
                Err(e) => {
                    warn!("Failed to send {}: {}", message.summary(), e);
                    return Err(MessagingError::from(e));
                }
            };

            for (tab_id, reason) in &report.failed {
                debug!("Delivery of {} to tab {} failed: {}", id, tab_id, reason);
            }
            if report.delivered == 0 {
                let failed: Vec<Value> = report
                    .failed
                    .iter()
                    .map(|(tab, reason)| json!({ "tabId": tab, "reason": reason }))
                    .collect();
                return Err(MessagingError::connection(format!(
                    "Failed to send message: no receiver for {}",
                    message.route()
                ))
                .with_details(json!({ "failed": failed })));
            }

            for reply in report.replies {
                self.accept_reply(reply);
            }

            match rx.await {
                Ok(outcome) => outcome,
                Err(_) => Err(MessagingError::new(
                    licita_protocols::ErrorCode::ConnectionClosed,
                    "Request was dropped before completion",
                )),
            }
        };

        let outcome = match tokio::time::timeout(timeout, exchange).await {
            Ok(outcome) => outcome,
            Err(_) => Err(MessagingError::timeout(format!(
                "Request timed out after {}ms",
                timeout.as_millis()
            ))
            .with_details(json!({
                "messageId": id,
                "category": message.category,
                "action": message.action,
            }))),
        };

        // Settled entries are already gone; this covers timeouts and
        // delivery failures.
        self.inner.pending.remove(&id);
        outcome
    }

    /// Feed a reply returned through the delivery path into correlation.
    fn accept_reply(&self, reply: Value) {
        match Message::from_wire(reply) {
            Ok(message) => {
                self.log_traffic("Received", &message);
                if !self.settle(&message) {
                    trace!("Dropped reply {} with no pending request", message.id);
                }
            }
            Err(e) => debug!("Ignoring malformed reply: {}", e),
        }
    }

    /// Send an event. Delivery failures are logged, never returned.
    ///
    /// Delivery runs on the current Tokio runtime; called outside one, the
    /// event is dropped with a warning.
    pub fn send_event(
        &self,
        key: impl Into<RouteKey>,
        event_name: impl Into<String>,
        payload: Option<Value>,
        options: EventOptions,
    ) {
        let message = Message::event(self.inner.source, &key.into(), event_name, payload);
        self.log_traffic("Sending", &message);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime to send {}; event dropped", message.summary());
            return;
        };
        let transport = self.inner.transport.clone();
        runtime.spawn(async move {
            match transport.deliver(&message, options.destination).await {
                Ok(report) => {
                    for (tab_id, reason) in report.failed {
                        debug!("Event {} not delivered to tab {}: {}", message.id, tab_id, reason);
                    }
                }
                Err(e) => warn!("Error sending event {}: {}", message.summary(), e),
            }
        });
    }

    /// Subscribe to an event, whether published here or received from
    /// another context.
    pub fn on_event<F>(&self, event_name: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.inner.events.subscribe(event_name, callback)
    }

    /// Publish on this context's emitter only.
    pub fn emit_local(&self, event_name: &str, payload: Value) -> usize {
        self.inner.events.publish(event_name, &payload)
    }

    fn log_traffic(&self, direction: &str, message: &Message) {
        if self.is_debug() {
            info!("[MessageBus:{}] {} {}", self.inner.source, direction, message.summary());
        } else {
            trace!("[MessageBus:{}] {} {}", self.inner.source, direction, message.summary());
        }
    }

    fn log_debug(&self, text: String) {
        if self.is_debug() {
            info!("[MessageBus:{}] {}", self.inner.source, text);
        } else {
            debug!("[MessageBus:{}] {}", self.inner.source, text);
        }
    }
}

/// Non-owning reference to a [`MessageBus`].
#[derive(Clone)]
pub struct WeakMessageBus {
    inner: Weak<BusInner>,
}

impl WeakMessageBus {
    pub fn upgrade(&self) -> Option<MessageBus> {
        self.inner.upgrade().map(|inner| MessageBus { inner })
    }
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBus")
            .field("source", &self.inner.source)
            .field("handlers", &self.inner.handlers.len())
            .field("pending", &self.inner.pending.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
