use serde::{Deserialize, Serialize};

use super::Ack;
use crate::types::UiAction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

route!(UpdateBadge, UiAction::UpdateBadge, BadgeRequest => Ack);
