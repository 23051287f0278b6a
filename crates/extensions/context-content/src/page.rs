//! The page a content script is injected into.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::Mutex;

use licita_protocols::now_millis;
use licita_protocols::route::AuctionSnapshot;

/// Title, URL and the selectors that match something on the page.
#[derive(Debug)]
pub struct PageDocument {
    url: String,
    title: String,
    elements: BTreeSet<String>,
    highlights: Mutex<BTreeMap<String, String>>,
}

impl PageDocument {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            elements: BTreeSet::new(),
            highlights: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn with_elements<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elements.extend(selectors.into_iter().map(Into::into));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn snapshot(&self) -> AuctionSnapshot {
        AuctionSnapshot {
            title: self.title.clone(),
            url: self.url.clone(),
            timestamp: now_millis(),
        }
    }

    /// Mark the element matching `selector`. Returns `false` when nothing
    /// matches.
    pub fn highlight(&self, selector: &str, color: &str) -> bool {
        if !self.elements.contains(selector) {
            return false;
        }
        self.highlights
            .lock()
            .insert(selector.to_string(), color.to_string());
        true
    }

    /// Selector to color of every highlighted element.
    pub fn highlights(&self) -> BTreeMap<String, String> {
        self.highlights.lock().clone()
    }
}
