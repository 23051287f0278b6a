use super::*;
use std::sync::{Arc, Mutex};

use licita_platform::Manifest;
use licita_protocols::Source;
use licita_transport_chrome::BackgroundTransport;

/// Collects event payloads.
#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Value>>>);

impl Recorder {
    fn push(&self, value: &Value) {
        self.0.lock().unwrap().push(value.clone());
    }

    fn all(&self) -> Vec<Value> {
        self.0.lock().unwrap().clone()
    }
}

fn setup() -> (ExtensionHost, MessageBus) {
    let host = ExtensionHost::new(Manifest::new("Naval Auction Assistant", "1.2.0", ["storage"]));
    let transport = Arc::new(BackgroundTransport::new(host.clone(), host.attach_background()));
    let bus = MessageBus::new(Source::Background, transport);
    (host, bus)
}

#[tokio::test]
async fn test_install_seeds_storage() {
    let (host, bus) = setup();
    let installed = Recorder::default();
    let recorder = installed.clone();
    let _sub = bus.on_event(SystemEvent::ExtensionInstalled.as_str(), move |p| recorder.push(p));

    handle_installed(&bus, &host, &InstallReason::Install).unwrap();

    let local = host.storage(AreaName::Local).unwrap();
    assert_eq!(local.get_one("version"), Some(json!("1.2.0")));
    assert_eq!(local.get_one("history"), Some(json!([])));
    assert_eq!(local.get_one("lastSync"), Some(Value::Null));
    assert_eq!(
        local.get_one("preferences").unwrap()["downloadPath"],
        "downloads"
    );
    assert_eq!(installed.all()[0]["version"], "1.2.0");
}

#[tokio::test]
async fn test_update_rewrites_version() {
    let (host, bus) = setup();
    let local = host.storage(AreaName::Local).unwrap();
    local.set(default_storage("1.0.0")).unwrap();

    let updated = Recorder::default();
    let recorder = updated.clone();
    let _sub = bus.on_event(SystemEvent::ExtensionUpdated.as_str(), move |p| recorder.push(p));

    let reason = InstallReason::Update {
        previous_version: "1.0.0".to_string(),
    };
    handle_installed(&bus, &host, &reason).unwrap();

    assert_eq!(local.get_one("version"), Some(json!("1.2.0")));
    assert_eq!(local.get_one("preferences").unwrap()["autoFill"], true);
    assert_eq!(
        updated.all(),
        vec![json!({"previousVersion": "1.0.0", "currentVersion": "1.2.0"})]
    );
}

#[tokio::test]
async fn test_cleanup_keeps_preferences_and_version() {
    let (host, bus) = setup();
    handle_installed(&bus, &host, &InstallReason::Install).unwrap();

    cleanup_storage(&host).unwrap();

    let local = host.storage(AreaName::Local).unwrap();
    let mut keys: Vec<String> = local.get(None).keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec!["preferences", "version"]);
}

#[tokio::test]
async fn test_install_without_storage_permission() {
    let host = ExtensionHost::new(Manifest::new("x", "1.0.0", ["tabs"]));
    let transport = Arc::new(BackgroundTransport::new(host.clone(), host.attach_background()));
    let bus = MessageBus::new(Source::Background, transport);

    let err = handle_installed(&bus, &host, &InstallReason::Install).unwrap_err();
    assert_eq!(err.code, licita_protocols::ErrorCode::PermissionDenied);
}
