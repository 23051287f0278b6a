use tracing::{debug, error, info, warn};

use licita_core::MessageBus;
use licita_protocols::route::{
    Ack, ExtensionStatus, GetStatus, Log, LogLevel, Ping, PingResponse, SetDebug,
    SetDebugResponse,
};
use licita_protocols::{now_millis, Source, SystemAction, SystemEvent};
use serde_json::json;

use super::{announce, Shared};

pub(super) fn register(bus: &MessageBus, shared: &Shared) {
    bus.register_route(Ping, |(), _request| async move {
        Ok(PingResponse {
            timestamp: now_millis(),
            source: Source::Background,
            url: None,
        })
    });

    let host = shared.host.clone();
    bus.register_route(GetStatus, move |(), _request| {
        let version = host.manifest().version.clone();
        async move {
            Ok(ExtensionStatus {
                is_enabled: true,
                version,
                timestamp: now_millis(),
            })
        }
    });

    let shared_debug = shared.clone();
    bus.register_route(SetDebug, move |request, _message| {
        let shared = shared_debug.clone();
        async move {
            let bus = shared.bus()?;
            bus.set_debug(request.enabled);
            announce(
                &bus,
                SystemAction::SetDebug,
                SystemEvent::DebugModeChanged.as_str(),
                json!({ "enabled": request.enabled }),
            );
            Ok(SetDebugResponse {
                success: true,
                debug_enabled: request.enabled,
            })
        }
    });

    bus.register_route(Log, |request, message| async move {
        let from = message.source;
        match request.level {
            LogLevel::Error => error!("[Log:{}] {}", from, request.content),
            LogLevel::Warn => warn!("[Log:{}] {}", from, request.content),
            LogLevel::Debug => debug!("[Log:{}] {}", from, request.content),
            LogLevel::Info => info!("[Log:{}] {}", from, request.content),
        }
        Ok(Ack::ok())
    });
}
