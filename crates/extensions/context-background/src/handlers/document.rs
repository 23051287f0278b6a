use serde_json::json;

use licita_core::MessageBus;
use licita_protocols::route::{FetchDocument, HighlightDocument};
use licita_protocols::MessagingError;

use super::{forward_options, Shared};

pub(super) fn register(bus: &MessageBus, shared: &Shared) {
    bus.register_route(FetchDocument, |request, _message| async move {
        Err(anyhow::Error::new(
            MessagingError::action_failed("Document fetch is not implemented yet")
                .with_details(json!({ "documentId": request.document_id })),
        ))
    });

    let shared = shared.clone();
    bus.register_route(HighlightDocument, move |request, message| {
        let shared = shared.clone();
        async move {
            let bus = shared.bus()?;
            Ok(bus
                .request(HighlightDocument, request, forward_options(&message))
                .await?)
        }
    });
}
