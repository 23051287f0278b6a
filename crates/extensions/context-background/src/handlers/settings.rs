use licita_core::MessageBus;
use licita_protocols::route::{Ack, GetSettings, ResetSettings, SetSettings};
use licita_protocols::{SettingsAction, SettingsEvent};
use serde_json::to_value;

use super::{announce, Shared};

pub(super) fn register(bus: &MessageBus, shared: &Shared) {
    let store = shared.settings.clone();
    bus.register_route(GetSettings, move |(), _request| {
        let store = store.clone();
        async move { Ok(store.load()?) }
    });

    let set_shared = shared.clone();
    bus.register_route(SetSettings, move |patch, _request| {
        let shared = set_shared.clone();
        async move {
            let settings = shared.settings.update(patch)?;
            announce(
                &shared.bus()?,
                SettingsAction::Set,
                SettingsEvent::Updated.as_str(),
                to_value(&settings)?,
            );
            Ok(Ack::ok())
        }
    });

    let reset_shared = shared.clone();
    bus.register_route(ResetSettings, move |(), _request| {
        let shared = reset_shared.clone();
        async move {
            let settings = shared.settings.reset()?;
            announce(
                &shared.bus()?,
                SettingsAction::Reset,
                SettingsEvent::Reset.as_str(),
                to_value(&settings)?,
            );
            Ok(settings)
        }
    });
}
