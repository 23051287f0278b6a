//! The extension host: frames, tabs, listeners and shared platform state.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use licita_protocols::TabId;

use crate::error::PlatformError;
use crate::manifest::{Manifest, Permission};
use crate::messaging::{dispatch_first_reply, Listener, ListenerId, MessageSender, ReplyHandle};
use crate::storage::{AreaName, StorageArea};
use crate::window::{WindowChannel, WindowId};

pub type FrameId = u64;

const EXTENSION_ORIGIN: &str = "chrome-extension://licita";

/// Default sync storage quota in bytes.
pub const SYNC_QUOTA_BYTES: u64 = 102_400;
/// Default local and session storage quota in bytes.
pub const LOCAL_QUOTA_BYTES: u64 = 10_485_760;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Background,
    Popup,
    Content(TabId),
}

/// An attached execution context.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub id: FrameId,
    pub kind: FrameKind,
    pub url: String,
}

impl Frame {
    pub fn tab_id(&self) -> Option<TabId> {
        match self.kind {
            FrameKind::Content(tab_id) => Some(tab_id),
            _ => None,
        }
    }

    fn sender(&self) -> MessageSender {
        MessageSender {
            frame_id: self.id,
            tab_id: self.tab_id(),
            url: Some(self.url.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    pub url: String,
    pub title: String,
    pub window_id: WindowId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub text: String,
    pub background_color: Option<String>,
}

/// Why the background was started for the first time in this version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallReason {
    Install,
    Update { previous_version: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Extension pages: receive runtime messages.
    Runtime,
    /// Content scripts of one tab: receive tab messages.
    Tab(TabId),
}

struct Tab {
    info: TabInfo,
    window: WindowChannel,
}

struct HostInner {
    manifest: Manifest,
    next_id: AtomicU64,
    next_tab: AtomicI64,
    frames: RwLock<HashMap<FrameId, Frame>>,
    listeners: RwLock<Vec<(Scope, Listener)>>,
    tabs: RwLock<BTreeMap<TabId, Tab>>,
    local: StorageArea,
    sync: StorageArea,
    session: StorageArea,
    badge: Mutex<Badge>,
}

/// Shared handle to the simulated browser.
#[derive(Clone)]
pub struct ExtensionHost {
    inner: Arc<HostInner>,
}

impl ExtensionHost {
    pub fn new(manifest: Manifest) -> Self {
        Self::with_quotas(manifest, SYNC_QUOTA_BYTES, LOCAL_QUOTA_BYTES)
    }

    pub fn with_quotas(manifest: Manifest, sync_quota: u64, local_quota: u64) -> Self {
        Self {
            inner: Arc::new(HostInner {
                manifest,
                next_id: AtomicU64::new(1),
                next_tab: AtomicI64::new(1),
                frames: RwLock::new(HashMap::new()),
                listeners: RwLock::new(Vec::new()),
                tabs: RwLock::new(BTreeMap::new()),
                local: StorageArea::new(AreaName::Local, local_quota),
                sync: StorageArea::new(AreaName::Sync, sync_quota),
                session: StorageArea::new(AreaName::Session, local_quota),
                badge: Mutex::new(Badge::default()),
            }),
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.inner.manifest
    }

    fn next_id(&self) -> u64 {
        self.inner.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn attach(&self, kind: FrameKind, url: String) -> Frame {
        let frame = Frame {
            id: self.next_id(),
            kind,
            url,
        };
        self.inner.frames.write().insert(frame.id, frame.clone());
        debug!("Attached frame {} ({:?})", frame.id, frame.kind);
        frame
    }

    pub fn attach_background(&self) -> Frame {
        self.attach(
            FrameKind::Background,
            format!("{}/background.js", EXTENSION_ORIGIN),
        )
    }

    pub fn open_popup(&self) -> Frame {
        self.attach(FrameKind::Popup, format!("{}/popup.html", EXTENSION_ORIGIN))
    }

    /// Inject a content script into `tab_id`.
    pub fn inject_content_script(&self, tab_id: TabId) -> Result<Frame, PlatformError> {
        let url = self
            .tab(tab_id)
            .map(|tab| tab.url)
            .ok_or(PlatformError::NoSuchTab(tab_id))?;
        Ok(self.attach(FrameKind::Content(tab_id), url))
    }

    /// Remove a frame and every listener it registered.
    pub fn detach(&self, frame_id: FrameId) {
        self.inner.frames.write().remove(&frame_id);
        self.inner
            .listeners
            .write()
            .retain(|(_, listener)| listener.frame_id != frame_id);
    }

    pub fn open_tab(&self, url: impl Into<String>, title: impl Into<String>) -> TabInfo {
        let id = self.inner.next_tab.fetch_add(1, Ordering::Relaxed);
        let window = WindowChannel::new(self.next_id());
        let info = TabInfo {
            id,
            url: url.into(),
            title: title.into(),
            window_id: window.id(),
        };
        self.inner.tabs.write().insert(
            id,
            Tab {
                info: info.clone(),
                window,
            },
        );
        info!("Opened tab {} at {}", id, info.url);
        info
    }

    /// Close a tab, detaching the content scripts injected into it.
    pub fn close_tab(&self, tab_id: TabId) -> Result<(), PlatformError> {
        self.inner
            .tabs
            .write()
            .remove(&tab_id)
            .ok_or(PlatformError::NoSuchTab(tab_id))?;

        let frames: Vec<FrameId> = self
            .inner
            .frames
            .read()
            .values()
            .filter(|f| f.tab_id() == Some(tab_id))
            .map(|f| f.id)
            .collect();
        for frame_id in frames {
            self.detach(frame_id);
        }
        info!("Closed tab {}", tab_id);
        Ok(())
    }

    pub fn tabs_query(&self) -> Vec<TabInfo> {
        self.inner
            .tabs
            .read()
            .values()
            .map(|tab| tab.info.clone())
            .collect()
    }

    pub fn tab(&self, tab_id: TabId) -> Option<TabInfo> {
        self.inner.tabs.read().get(&tab_id).map(|tab| tab.info.clone())
    }

    /// The window channel shared by a tab's page and content scripts.
    pub fn window(&self, tab_id: TabId) -> Result<WindowChannel, PlatformError> {
        self.inner
            .tabs
            .read()
            .get(&tab_id)
            .map(|tab| tab.window.clone())
            .ok_or(PlatformError::NoSuchTab(tab_id))
    }

    /// Register a message listener for `frame`.
    ///
    /// Content scripts receive tab messages for their tab; extension pages
    /// receive runtime messages.
    pub fn add_listener<F>(&self, frame: &Frame, callback: F) -> Result<ListenerId, PlatformError>
    where
        F: Fn(Value, MessageSender, ReplyHandle) + Send + Sync + 'static,
    {
        self.ensure_attached(frame)?;
        let scope = match frame.kind {
            FrameKind::Content(tab_id) => Scope::Tab(tab_id),
            FrameKind::Background | FrameKind::Popup => Scope::Runtime,
        };
        let id = ListenerId(self.next_id());
        self.inner.listeners.write().push((
            scope,
            Listener {
                id,
                frame_id: frame.id,
                callback: Arc::new(callback),
            },
        ));
        Ok(id)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.write();
        let before = listeners.len();
        listeners.retain(|(_, listener)| listener.id != id);
        listeners.len() != before
    }

    /// Send to every extension page except the sender. Resolves with the
    /// first reply, or `None` if every listener declined.
    pub async fn runtime_send(
        &self,
        from: &Frame,
        message: Value,
    ) -> Result<Option<Value>, PlatformError> {
        self.ensure_attached(from)?;
        let listeners = self.listeners_for(Scope::Runtime, from.id);
        if listeners.is_empty() {
            return Err(PlatformError::ReceivingEndMissing);
        }
        Ok(dispatch_first_reply(listeners, message, from.sender()).await)
    }

    /// Send to the content scripts of one tab.
    pub async fn tabs_send(
        &self,
        from: &Frame,
        tab_id: TabId,
        message: Value,
    ) -> Result<Option<Value>, PlatformError> {
        self.ensure_attached(from)?;
        if self.tab(tab_id).is_none() {
            return Err(PlatformError::NoSuchTab(tab_id));
        }
        let listeners = self.listeners_for(Scope::Tab(tab_id), from.id);
        if listeners.is_empty() {
            return Err(PlatformError::ReceivingEndMissing);
        }
        Ok(dispatch_first_reply(listeners, message, from.sender()).await)
    }

    fn listeners_for(&self, scope: Scope, exclude: FrameId) -> Vec<Listener> {
        self.inner
            .listeners
            .read()
            .iter()
            .filter(|(s, listener)| *s == scope && listener.frame_id != exclude)
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    fn ensure_attached(&self, frame: &Frame) -> Result<(), PlatformError> {
        if self.inner.frames.read().contains_key(&frame.id) {
            Ok(())
        } else {
            Err(PlatformError::FrameDetached(frame.id))
        }
    }

    /// A storage area. Requires the `storage` permission.
    pub fn storage(&self, area: AreaName) -> Result<&StorageArea, PlatformError> {
        if !self.inner.manifest.has(Permission::Storage) {
            return Err(PlatformError::PermissionDenied(
                Permission::Storage.to_string(),
            ));
        }
        Ok(match area {
            AreaName::Local => &self.inner.local,
            AreaName::Sync => &self.inner.sync,
            AreaName::Session => &self.inner.session,
        })
    }

    pub fn set_badge_text(&self, text: impl Into<String>) {
        self.inner.badge.lock().text = text.into();
    }

    pub fn set_badge_background_color(&self, color: impl Into<String>) {
        self.inner.badge.lock().background_color = Some(color.into());
    }

    pub fn badge(&self) -> Badge {
        self.inner.badge.lock().clone()
    }
}

impl std::fmt::Debug for ExtensionHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionHost")
            .field("name", &self.inner.manifest.name)
            .field("frames", &self.inner.frames.read().len())
            .field("tabs", &self.inner.tabs.read().len())
            .finish()
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
