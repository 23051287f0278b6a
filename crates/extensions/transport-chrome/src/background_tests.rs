use super::*;
use crate::listener::testing::RecordingSink;
use crate::{ContentTransport, PageTags};
use licita_platform::Manifest;
use licita_protocols::{AuctionAction, RouteKey, Source, SystemAction, SystemEvent};
use serde_json::json;
use std::time::Duration;

fn analyze() -> Message {
    let route: RouteKey = AuctionAction::Analyze.into();
    Message::request(Source::Background, &route, None, None, None)
}

struct Tab {
    id: TabId,
    sink: Arc<RecordingSink>,
    _transport: ContentTransport,
}

fn open_tab(host: &ExtensionHost, url: &str) -> Tab {
    let info = host.open_tab(url, "Notice");
    let transport =
        ContentTransport::new(host.clone(), host.inject_content_script(info.id).unwrap(), PageTags::default())
            .unwrap();
    let sink = Arc::new(RecordingSink::default());
    transport.listen(sink.clone()).unwrap();
    Tab {
        id: info.id,
        sink,
        _transport: transport,
    }
}

#[tokio::test]
async fn test_send_to_one_tab() {
    let host = ExtensionHost::new(Manifest::default());
    let background = BackgroundTransport::new(host.clone(), host.attach_background());
    let a = open_tab(&host, "https://e-licitatie.ro/a");
    let b = open_tab(&host, "https://e-licitatie.ro/b");

    let message = analyze();
    let report = background.deliver(&message, Destination::Tab(b.id)).await.unwrap();

    assert_eq!(report.delivered, 1);
    assert_eq!(report.replies.len(), 1);
    assert!(a.sink.received().is_empty());
    assert_eq!(b.sink.received()[0].id, message.id);
}

#[tokio::test]
async fn test_send_to_missing_tab() {
    let host = ExtensionHost::new(Manifest::default());
    let background = BackgroundTransport::new(host.clone(), host.attach_background());

    let err = background.deliver(&analyze(), Destination::Tab(77)).await.unwrap_err();
    assert!(matches!(err, TransportError::TabNotFound(77)));
}

#[tokio::test]
async fn test_broadcast_tracks_failures_per_tab() {
    let host = ExtensionHost::new(Manifest::default());
    let background = BackgroundTransport::new(host.clone(), host.attach_background());
    let a = open_tab(&host, "https://e-licitatie.ro/a");
    // A tab with no content script.
    let bare = host.open_tab("https://example.com", "Elsewhere");
    let c = open_tab(&host, "https://e-licitatie.ro/c");

    let route: RouteKey = SystemAction::Ping.into();
    let event = Message::event(
        Source::Background,
        &route,
        SystemEvent::DebugModeChanged.as_str(),
        Some(json!({"enabled": true})),
    );
    let report = background.deliver(&event, Destination::Default).await.unwrap();

    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, bare.id);

    // Events are handed to the sink on a spawned task.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(a.sink.received().len(), 1);
    assert_eq!(c.sink.received().len(), 1);
}

#[tokio::test]
async fn test_broadcast_with_no_tabs() {
    let host = ExtensionHost::new(Manifest::default());
    let background = BackgroundTransport::new(host.clone(), host.attach_background());

    let report = background.deliver(&analyze(), Destination::Default).await.unwrap();
    assert_eq!(report.delivered, 0);
    assert!(report.failed.is_empty());
}

#[tokio::test]
async fn test_page_destination_unsupported() {
    let host = ExtensionHost::new(Manifest::default());
    let background = BackgroundTransport::new(host.clone(), host.attach_background());

    assert!(matches!(
        background.deliver(&analyze(), Destination::Page).await,
        Err(TransportError::Unsupported(_))
    ));
}

#[tokio::test]
async fn test_malformed_runtime_message_gets_no_reply() {
    let host = ExtensionHost::new(Manifest::default());
    let background = BackgroundTransport::new(host.clone(), host.attach_background());
    let sink = Arc::new(RecordingSink::default());
    background.listen(sink.clone()).unwrap();

    let popup = host.open_popup();
    let reply = host
        .runtime_send(&popup, json!({"hello": "world"}))
        .await
        .unwrap();
    assert_eq!(reply, None);
    assert!(sink.received().is_empty());
}

#[tokio::test]
async fn test_listener_removed_on_drop() {
    let host = ExtensionHost::new(Manifest::default());
    let popup = host.open_popup();
    {
        let background = BackgroundTransport::new(host.clone(), host.attach_background());
        background.listen(Arc::new(RecordingSink::default())).unwrap();
        assert!(host.runtime_send(&popup, analyze().to_wire()).await.is_ok());
    }
    assert!(host.runtime_send(&popup, analyze().to_wire()).await.is_err());
}

/// Takes requests and never answers them.
struct StalledSink;

#[async_trait]
impl InboundSink for StalledSink {
    async fn receive(&self, _message: Message) -> Option<Message> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_broadcast_returns_first_reply_without_waiting_for_slow_tabs() {
    let host = ExtensionHost::new(Manifest::default());
    let background = BackgroundTransport::new(host.clone(), host.attach_background());

    let stalled_tab = host.open_tab("https://e-licitatie.ro/slow", "Slow notice");
    let stalled = ContentTransport::new(
        host.clone(),
        host.inject_content_script(stalled_tab.id).unwrap(),
        PageTags::default(),
    )
    .unwrap();
    stalled.listen(Arc::new(StalledSink)).unwrap();
    let fast = open_tab(&host, "https://e-licitatie.ro/fast");

    let message = analyze();
    let report = tokio::time::timeout(
        Duration::from_secs(1),
        background.deliver(&message, Destination::Default),
    )
    .await
    .expect("broadcast waited for the stalled tab")
    .unwrap();

    assert_eq!(report.delivered, 2);
    assert!(report.failed.is_empty());
    assert_eq!(report.replies.len(), 1);
    let reply = Message::from_wire(report.replies[0].clone()).unwrap();
    assert_eq!(reply.request_id(), Some(message.id.as_str()));
    assert_eq!(fast.sink.received().len(), 1);
}
