use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Ack;
use crate::types::DocumentAction;

pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#FFFF00";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRequest {
    pub selector: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_HIGHLIGHT_COLOR.to_string()
}

route!(FetchDocument, DocumentAction::Fetch, DocumentRequest => Value);
route!(HighlightDocument, DocumentAction::Highlight, HighlightRequest => Ack);
