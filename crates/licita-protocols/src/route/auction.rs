use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::AuctionAction;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuctionList {
    pub auctions: Vec<Value>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionDetailsRequest {
    pub auction_id: String,
}

/// What the content script reads off an auction page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionSnapshot {
    pub title: String,
    pub url: String,
    pub timestamp: i64,
}

route!(FetchAuctionList, AuctionAction::FetchList, () => AuctionList);
route!(FetchAuctionDetails, AuctionAction::FetchDetails, AuctionDetailsRequest => Value);
route!(
    /// Analyze the auction page open in a tab.
    AnalyzeAuction, AuctionAction::Analyze, () => AuctionSnapshot
);
