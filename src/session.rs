//! A simulated extension session assembled from configuration.

use tracing::warn;

use licita_config::{Config, ExtensionConfig, MessagingConfig};
use licita_context_background::BackgroundContext;
use licita_context_content::{ContentContext, PageDocument};
use licita_context_popup::MessagingService;
use licita_core::BusConfig;
use licita_platform::{ExtensionHost, InstallReason, Manifest};
use licita_protocols::MessagingError;
use licita_transport_chrome::PageTags;

/// Elements every simulated auction page exposes for highlighting.
pub(crate) const PAGE_ELEMENTS: [&str; 3] = [".auction-title", ".estimated-value", ".closing-date"];

pub(crate) fn bus_config(config: &MessagingConfig) -> BusConfig {
    BusConfig {
        default_timeout: config.default_timeout(),
        default_retries: config.default_retries,
        debug: config.debug,
    }
}

pub(crate) fn manifest(config: &ExtensionConfig) -> Manifest {
    Manifest::new(&config.name, &config.version, &config.permissions)
}

pub(crate) fn host(config: &Config) -> ExtensionHost {
    ExtensionHost::with_quotas(
        manifest(&config.extension),
        config.storage.sync_quota_bytes,
        config.storage.local_quota_bytes,
    )
}

pub(crate) struct Session {
    pub host: ExtensionHost,
    pub background: BackgroundContext,
    pub tabs: Vec<ContentContext>,
    pub popup: MessagingService,
}

impl Session {
    /// Start the background, run its install hook, then open `tabs` auction
    /// pages and a popup.
    pub(crate) fn start(
        config: &Config,
        tabs: usize,
        url: &str,
        install: &InstallReason,
    ) -> Result<Self, MessagingError> {
        let host = host(config);
        let bus = bus_config(&config.messaging);

        let background = BackgroundContext::start(host.clone(), bus.clone())?;
        if let Err(e) = background.handle_installed(install) {
            warn!("Install handling failed, continuing without it: {}", e);
        }

        let mut contexts = Vec::with_capacity(tabs);
        for n in 1..=tabs {
            let title = format!("Licitatie {}", n);
            let tab = host.open_tab(url, &title);
            let page = PageDocument::new(url, title).with_elements(PAGE_ELEMENTS);
            contexts.push(ContentContext::start(
                host.clone(),
                tab.id,
                page,
                PageTags::new(&config.messaging.page_channel_tag),
                bus.clone(),
            )?);
        }

        let popup = MessagingService::open(host.clone(), bus)?;

        Ok(Self {
            host,
            background,
            tabs: contexts,
            popup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use licita_config::{ConfigLoader, ConfigValidator};

    #[test]
    fn test_bus_config_from_messaging_section() {
        let config = ConfigLoader::load_str(
            r#"
[messaging]
default_timeout_ms = 1500
default_retries = 2
debug = true
"#,
        )
        .unwrap();
        let bus = bus_config(&config.messaging);
        assert_eq!(bus.default_timeout.as_millis(), 1500);
        assert_eq!(bus.default_retries, 2);
        assert!(bus.debug);
    }

    #[test]
    fn test_manifest_from_extension_section() {
        let config = ConfigLoader::load_str(
            r#"
[extension]
version = "2.0.0"
permissions = ["tabs"]
"#,
        )
        .unwrap();
        let manifest = manifest(&config.extension);
        assert_eq!(manifest.version, "2.0.0");
        assert!(!manifest.has(licita_platform::Permission::Storage));
        assert!(manifest.has(licita_platform::Permission::Tabs));
    }

    #[tokio::test]
    async fn test_session_start() {
        let session = Session::start(
            &Config::default(),
            2,
            "https://e-licitatie.ro/",
            &InstallReason::Install,
        )
        .unwrap();
        assert_eq!(session.tabs.len(), 2);
        assert_eq!(session.host.tabs_query().len(), 2);

        let pong = session.popup.ping_background().await.unwrap();
        assert_eq!(pong.source, licita_protocols::Source::Background);
        assert!(session.background.bus().is_initialized());
    }

    #[tokio::test]
    async fn test_session_starts_without_storage_permission() {
        let config = ConfigLoader::load_str("[extension]\npermissions = [\"tabs\"]").unwrap();
        assert_eq!(ConfigValidator::validate(&config).into_result().unwrap().len(), 1);

        let session = Session::start(
            &config,
            1,
            "https://e-licitatie.ro/",
            &InstallReason::Install,
        )
        .unwrap();

        let pong = session.popup.ping_background().await.unwrap();
        assert_eq!(pong.source, licita_protocols::Source::Background);
        let err = session.popup.settings().await.unwrap_err();
        assert_eq!(err.code, licita_protocols::ErrorCode::PermissionDenied);
    }
}
