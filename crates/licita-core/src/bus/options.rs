//! Bus configuration and per-call options.

use std::time::Duration;

use licita_protocols::{Destination, TabId, DEFAULT_TIMEOUT_MS};

/// Defaults applied when a call does not override them.
#[derive(Debug, Clone)]
pub struct BusConfig {
    pub default_timeout: Duration,
    pub default_retries: u32,
    pub debug: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            default_retries: 0,
            debug: false,
        }
    }
}

/// Options for [`MessageBus::send_request`](super::MessageBus::send_request).
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub destination: Destination,
    pub timeout: Option<Duration>,
    pub retries: Option<u32>,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target one tab. The tab id also travels in the request so a
    /// background handler can forward it.
    pub fn to_tab(mut self, tab_id: TabId) -> Self {
        self.destination = Destination::Tab(tab_id);
        self
    }

    pub fn to_page(mut self) -> Self {
        self.destination = Destination::Page;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout_ms(self, ms: u64) -> Self {
        self.timeout(Duration::from_millis(ms))
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub(crate) fn tab_id(&self) -> Option<TabId> {
        match self.destination {
            Destination::Tab(id) => Some(id),
            _ => None,
        }
    }
}

/// Options for [`MessageBus::send_event`](super::MessageBus::send_event).
#[derive(Debug, Clone, Copy, Default)]
pub struct EventOptions {
    pub destination: Destination,
}

impl EventOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_tab(tab_id: TabId) -> Self {
        Self {
            destination: Destination::Tab(tab_id),
        }
    }

    pub fn to_page() -> Self {
        Self {
            destination: Destination::Page,
        }
    }
}
