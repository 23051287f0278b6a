//! Routing vocabulary: categories and the actions scoped to each.
//!
//! Actions are not globally unique (`analyze` exists for both auctions and
//! documents), so handler lookup always uses the `(category, action)` pair
//! carried by [`RouteKey`].

use serde::{Deserialize, Serialize};

/// Coarse domain area of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    System,
    Auction,
    Document,
    Settings,
    Ui,
    Auth,
    Notification,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::System,
        Category::Auction,
        Category::Document,
        Category::Settings,
        Category::Ui,
        Category::Auth,
        Category::Notification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Auction => "auction",
            Self::Document => "document",
            Self::Settings => "settings",
            Self::Ui => "ui",
            Self::Auth => "auth",
            Self::Notification => "notification",
        }
    }

    /// Wire names of every action defined for this category.
    pub fn actions(&self) -> &'static [&'static str] {
        match self {
            Self::System => SystemAction::NAMES,
            Self::Auction => AuctionAction::NAMES,
            Self::Document => DocumentAction::NAMES,
            Self::Settings => SettingsAction::NAMES,
            Self::Ui => UiAction::NAMES,
            Self::Auth => AuthAction::NAMES,
            Self::Notification => NotificationAction::NAMES,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declares a per-category action enum with its wire names.
macro_rules! actions {
    ($(#[$meta:meta])* $name:ident => $category:expr, { $($variant:ident = $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const NAMES: &'static [&'static str] = &[$($wire),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }

            pub fn parse(action: &str) -> Option<Self> {
                match action {
                    $($wire => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl From<$name> for RouteKey {
            fn from(action: $name) -> Self {
                RouteKey::new($category, action.as_str())
            }
        }
    };
}

actions!(
    /// System-level actions.
    SystemAction => Category::System, {
        Ping = "ping",
        Init = "init",
        GetStatus = "getStatus",
        SetDebug = "setDebug",
        Log = "log",
    }
);

actions!(
    /// Auction actions.
    AuctionAction => Category::Auction, {
        FetchList = "fetchList",
        FetchDetails = "fetchDetails",
        Analyze = "analyze",
        Monitor = "monitor",
        StopMonitoring = "stopMonitoring",
        Notify = "notify",
    }
);

actions!(
    /// Procurement document actions.
    DocumentAction => Category::Document, {
        Fetch = "fetch",
        Analyze = "analyze",
        Highlight = "highlight",
        ExtractData = "extractData",
        Convert = "convert",
    }
);

actions!(
    /// Settings actions.
    SettingsAction => Category::Settings, {
        Get = "get",
        Set = "set",
        Reset = "reset",
        Sync = "sync",
    }
);

actions!(
    /// UI actions.
    UiAction => Category::Ui, {
        OpenPopup = "openPopup",
        ClosePopup = "closePopup",
        ShowNotification = "showNotification",
        UpdateBadge = "updateBadge",
    }
);

actions!(
    /// Authentication actions.
    AuthAction => Category::Auth, {
        Login = "login",
        Logout = "logout",
        CheckStatus = "checkStatus",
        RefreshToken = "refreshToken",
    }
);

actions!(
    /// Notification actions.
    NotificationAction => Category::Notification, {
        Show = "show",
        Dismiss = "dismiss",
        Click = "click",
    }
);

/// Routing key: a category and an action scoped to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub category: Category,
    pub action: String,
}

impl RouteKey {
    pub fn new(category: Category, action: impl Into<String>) -> Self {
        Self {
            category,
            action: action.into(),
        }
    }

    /// Whether the action belongs to the category's vocabulary.
    pub fn is_known(&self) -> bool {
        self.category.actions().contains(&self.action.as_str())
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.category, self.action)
    }
}
