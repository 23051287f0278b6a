//! Event names carried by event messages and published on local emitters.

macro_rules! event_names {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }
    };
}

event_names!(
    /// Extension-wide events.
    SystemEvent {
        ExtensionInstalled = "extension.installed",
        ExtensionUpdated = "extension.updated",
        ExtensionEnabled = "extension.enabled",
        ExtensionDisabled = "extension.disabled",
        ConnectionState = "connection.state",
        DebugModeChanged = "debug.modeChanged",
    }
);

event_names!(
    /// Auction events.
    AuctionEvent {
        ListUpdated = "auction.listUpdated",
        DetailsUpdated = "auction.detailsUpdated",
        NewAuction = "auction.new",
        ClosingSoon = "auction.closingSoon",
        Closed = "auction.closed",
        Changed = "auction.changed",
        MonitoringStarted = "auction.monitoringStarted",
        MonitoringStopped = "auction.monitoringStopped",
    }
);

event_names!(
    /// Document events.
    DocumentEvent {
        Loaded = "document.loaded",
        ProcessingStarted = "document.processingStarted",
        ProcessingCompleted = "document.processingCompleted",
        ProcessingFailed = "document.processingFailed",
        HighlightAdded = "document.highlightAdded",
        HighlightRemoved = "document.highlightRemoved",
        DataExtracted = "document.dataExtracted",
    }
);

event_names!(
    /// Settings events.
    SettingsEvent {
        Updated = "settings.updated",
        Reset = "settings.reset",
        Synced = "settings.synced",
    }
);

event_names!(
    /// UI events.
    UiEvent {
        PopupOpened = "ui.popupOpened",
        PopupClosed = "ui.popupClosed",
        TabActivated = "ui.tabActivated",
        ThemeChanged = "ui.themeChanged",
    }
);

event_names!(
    /// Authentication events.
    AuthEvent {
        LoggedIn = "auth.loggedIn",
        LoggedOut = "auth.loggedOut",
        SessionExpired = "auth.sessionExpired",
        TokenRefreshed = "auth.tokenRefreshed",
    }
);

event_names!(
    /// Notification events.
    NotificationEvent {
        Shown = "notification.shown",
        Dismissed = "notification.dismissed",
        Clicked = "notification.clicked",
    }
);

event_names!(
    /// Storage events, local to the background context.
    StorageEvent {
        Changed = "storage.changed",
    }
);
