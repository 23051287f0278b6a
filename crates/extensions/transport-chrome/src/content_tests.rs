use super::*;
use crate::listener::testing::RecordingSink;
use licita_platform::{Manifest, WindowMessage};
use licita_protocols::{DocumentAction, RouteKey, Source};
use std::time::Duration;
use tokio::sync::broadcast;

fn highlight() -> Message {
    let route: RouteKey = DocumentAction::Highlight.into();
    Message::request(
        Source::Content,
        &route,
        Some(json!({"selector": ".price"})),
        None,
        None,
    )
}

struct Fixture {
    host: ExtensionHost,
    transport: ContentTransport,
    window: WindowChannel,
}

fn fixture() -> Fixture {
    let host = ExtensionHost::new(Manifest::default());
    let tab = host.open_tab("https://e-licitatie.ro/pub/notices/1", "Notice 1");
    let frame = host.inject_content_script(tab.id).unwrap();
    let transport = ContentTransport::new(host.clone(), frame, PageTags::default()).unwrap();
    let window = host.window(tab.id).unwrap();
    Fixture {
        host,
        transport,
        window,
    }
}

async fn next_tagged(rx: &mut broadcast::Receiver<WindowMessage>, tag: &str) -> Value {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let post = rx.recv().await.unwrap();
            if post.data["target"] == tag {
                return post.data;
            }
        }
    })
    .await
    .unwrap()
}

#[test]
fn test_page_tags() {
    let tags = PageTags::default();
    assert_eq!(tags.inbound, "naval-auction-assistant");
    assert_eq!(tags.outbound, "naval-auction-assistant-page");
}

#[tokio::test]
async fn test_page_request_answered_over_window() {
    let fx = fixture();
    let sink = Arc::new(RecordingSink::default());
    fx.transport.listen(sink.clone()).unwrap();
    let mut rx = fx.window.subscribe();

    let request = highlight();
    fx.window.post_message(json!({
        "target": "naval-auction-assistant",
        "message": request.to_wire(),
    }));

    let post = next_tagged(&mut rx, "naval-auction-assistant-page").await;
    let reply = Message::from_wire(post["message"].clone()).unwrap();
    assert_eq!(reply.request_id(), Some(request.id.as_str()));
    assert_eq!(sink.received().len(), 1);
}

#[tokio::test]
async fn test_untrusted_window_posts_ignored() {
    let fx = fixture();
    let sink = Arc::new(RecordingSink::default());
    fx.transport.listen(sink.clone()).unwrap();
    let mut rx = fx.window.subscribe();

    // Wrong tag, foreign window, malformed envelope.
    fx.window.post_message(json!({"target": "someone-else", "message": highlight().to_wire()}));
    fx.window.post_from(
        fx.window.id() + 1000,
        json!({"target": "naval-auction-assistant", "message": highlight().to_wire()}),
    );
    fx.window.post_message(json!({"target": "naval-auction-assistant", "message": {"id": "x"}}));

    let accepted = highlight();
    fx.window.post_message(json!({
        "target": "naval-auction-assistant",
        "message": accepted.to_wire(),
    }));

    next_tagged(&mut rx, "naval-auction-assistant-page").await;
    let received = sink.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].id, accepted.id);
}

#[tokio::test]
async fn test_deliver_to_page() {
    let fx = fixture();
    let sink = Arc::new(RecordingSink::default());
    fx.transport.listen(sink.clone()).unwrap();
    let mut rx = fx.window.subscribe();

    let message = highlight();
    let report = fx.transport.deliver(&message, Destination::Page).await.unwrap();
    assert_eq!(report.delivered, 1);
    assert!(report.replies.is_empty());

    let post = next_tagged(&mut rx, "naval-auction-assistant-page").await;
    assert_eq!(post["message"]["id"], message.id);

    // The content script's own outbound post is not fed back into its bus.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(sink.received().is_empty());
}

#[tokio::test]
async fn test_deliver_default_goes_to_background() {
    let fx = fixture();
    let background = crate::BackgroundTransport::new(fx.host.clone(), fx.host.attach_background());
    let sink = Arc::new(RecordingSink::default());
    background.listen(sink.clone()).unwrap();

    let message = highlight();
    let report = fx.transport.deliver(&message, Destination::Default).await.unwrap();
    assert_eq!(report.replies.len(), 1);
    assert_eq!(sink.received()[0].id, message.id);
}

#[tokio::test]
async fn test_listen_twice() {
    let fx = fixture();
    let sink = Arc::new(RecordingSink::default());
    fx.transport.listen(sink.clone()).unwrap();
    assert!(matches!(
        fx.transport.listen(sink),
        Err(TransportError::AlreadyListening)
    ));
}

#[test]
fn test_requires_content_frame() {
    let host = ExtensionHost::new(Manifest::default());
    let popup = host.open_popup();
    assert!(matches!(
        ContentTransport::new(host, popup, PageTags::default()),
        Err(TransportError::Unsupported(_))
    ));
}
