use licita_core::MessageBus;
use licita_protocols::route::{Ack, UpdateBadge};

use super::Shared;

pub(super) fn register(bus: &MessageBus, shared: &Shared) {
    let host = shared.host.clone();
    bus.register_route(UpdateBadge, move |request, _message| {
        host.set_badge_text(request.text);
        if let Some(color) = request.background_color {
            host.set_badge_background_color(color);
        }
        async move { Ok(Ack::ok()) }
    });
}
