use licita_core::MessageBus;
use licita_protocols::now_millis;
use licita_protocols::route::{AnalyzeAuction, AuctionList, FetchAuctionList};

use super::{forward_options, Shared};

pub(super) fn register(bus: &MessageBus, shared: &Shared) {
    // The list is filled in by the site integration; until then it is
    // always empty.
    bus.register_route(FetchAuctionList, |(), _request| async move {
        Ok(AuctionList {
            auctions: Vec::new(),
            timestamp: now_millis(),
        })
    });

    // Page analysis runs in the content script of the tab.
    let shared = shared.clone();
    bus.register_route(AnalyzeAuction, move |(), request| {
        let shared = shared.clone();
        async move {
            let bus = shared.bus()?;
            Ok(bus.request(AnalyzeAuction, (), forward_options(&request)).await?)
        }
    });
}
