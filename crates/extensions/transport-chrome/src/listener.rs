//! Platform listener shared by every transport.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::trace;

use licita_platform::{ExtensionHost, Frame, ListenerId, MessageSender, PlatformError, ReplyHandle};
use licita_protocols::{InboundSink, Message, TransportError};

/// Map a platform failure onto the transport error vocabulary.
pub(crate) fn transport_error(err: PlatformError) -> TransportError {
    match err {
        PlatformError::ReceivingEndMissing => TransportError::TargetUnavailable(err.to_string()),
        PlatformError::NoSuchTab(tab_id) => TransportError::TabNotFound(tab_id),
        PlatformError::FrameDetached(_) => TransportError::ConnectionClosed(err.to_string()),
        other => TransportError::Platform(other.to_string()),
    }
}

/// The single runtime/tab listener a transport owns.
pub(crate) struct ListenerSlot {
    host: ExtensionHost,
    frame: Frame,
    serves_requests: bool,
    id: Mutex<Option<ListenerId>>,
}

impl ListenerSlot {
    pub(crate) fn new(host: ExtensionHost, frame: Frame) -> Self {
        Self {
            host,
            frame,
            serves_requests: true,
            id: Mutex::new(None),
        }
    }

    /// A slot that receives events and responses but leaves requests for
    /// other listeners to answer.
    pub(crate) fn events_only(host: ExtensionHost, frame: Frame) -> Self {
        Self {
            host,
            frame,
            serves_requests: false,
            id: Mutex::new(None),
        }
    }

    pub(crate) fn host(&self) -> &ExtensionHost {
        &self.host
    }

    pub(crate) fn frame(&self) -> &Frame {
        &self.frame
    }

    pub(crate) fn listen(&self, sink: Arc<dyn InboundSink>) -> Result<(), TransportError> {
        let mut slot = self.id.lock();
        if slot.is_some() {
            return Err(TransportError::AlreadyListening);
        }
        let serves_requests = self.serves_requests;
        let id = self
            .host
            .add_listener(&self.frame, move |raw, sender, reply| {
                on_platform_message(sink.clone(), serves_requests, raw, sender, reply)
            })
            .map_err(transport_error)?;
        *slot = Some(id);
        Ok(())
    }
}

impl Drop for ListenerSlot {
    fn drop(&mut self) {
        if let Some(id) = self.id.lock().take() {
            self.host.remove_listener(id);
        }
    }
}

fn on_platform_message(
    sink: Arc<dyn InboundSink>,
    serves_requests: bool,
    raw: Value,
    sender: MessageSender,
    reply: ReplyHandle,
) {
    let message = match Message::from_wire(raw) {
        Ok(message) => message,
        Err(e) => {
            trace!("Ignoring non-message from frame {}: {}", sender.frame_id, e);
            reply.decline();
            return;
        }
    };

    if message.is_request() {
        if !serves_requests {
            trace!("Leaving request {} to the background", message.id);
            reply.decline();
            return;
        }
        let reply = reply.defer();
        tokio::spawn(async move {
            match sink.receive(message).await {
                Some(answer) => reply.send(answer.to_wire()),
                None => reply.close(),
            }
        });
    } else {
        reply.decline();
        tokio::spawn(async move {
            sink.receive(message).await;
        });
    }
}
