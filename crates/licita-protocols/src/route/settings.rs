use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Ack;
use crate::types::SettingsAction;

/// User settings. Unknown keys are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: String,
    pub notifications: bool,
    pub auto_refresh: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            notifications: true,
            auto_refresh: false,
            extra: Map::new(),
        }
    }
}

/// Partial update merged over the stored settings.
pub type SettingsPatch = Map<String, Value>;

route!(GetSettings, SettingsAction::Get, () => Settings);
route!(SetSettings, SettingsAction::Set, SettingsPatch => Ack);
route!(ResetSettings, SettingsAction::Reset, () => Settings);
