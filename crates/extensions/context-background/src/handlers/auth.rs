use licita_core::MessageBus;
use licita_protocols::route::{AuthStatus, CheckAuthStatus};

/// No session handling yet: the user is always reported as logged out.
pub(super) fn register(bus: &MessageBus) {
    bus.register_route(CheckAuthStatus, |(), _request| async move {
        Ok(AuthStatus::default())
    });
}
