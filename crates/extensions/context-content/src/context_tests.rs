use super::*;
use std::time::Duration;

use serde_json::{json, Value};

use licita_context_background::BackgroundContext;
use licita_core::EventOptions;
use licita_platform::Manifest;
use licita_protocols::route::{
    AnalyzeAuction, HighlightDocument, HighlightRequest, SetDebug, SetDebugRequest,
};
use licita_protocols::{ErrorCode, Message, RouteKey, SystemAction};
use licita_transport_chrome::PopupTransport;

const NOTICE_URL: &str = "https://e-licitatie.ro/pub/notices/c-notice/v2/view/100";

struct Fixture {
    host: ExtensionHost,
    background: BackgroundContext,
    popup: MessageBus,
    content: ContentContext,
}

fn fixture() -> Fixture {
    let host = ExtensionHost::new(Manifest::default());
    let background = BackgroundContext::start(host.clone(), BusConfig::default()).unwrap();

    let tab = host.open_tab(NOTICE_URL, "Anunt de participare");
    let page = PageDocument::new(NOTICE_URL, "Anunt de participare")
        .with_elements([".auction-title", ".estimated-value"]);
    let content = ContentContext::start(
        host.clone(),
        tab.id,
        page,
        PageTags::default(),
        BusConfig::default(),
    )
    .unwrap();

    let popup = MessageBus::new(
        Source::Popup,
        Arc::new(PopupTransport::new(host.clone(), host.open_popup())),
    );
    popup.init().unwrap();

    Fixture {
        host,
        background,
        popup,
        content,
    }
}

async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}

#[tokio::test]
async fn test_ping_background() {
    let fx = fixture();
    let pong = fx.content.ping_background().await.unwrap();
    assert_eq!(pong.source, Source::Background);
}

#[tokio::test]
async fn test_answers_ping_with_page_url() {
    let fx = fixture();
    let tab_id = fx.content.tab_id().unwrap();

    let background = fx.background.bus();
    let pong = background
        .request(Ping, (), SendOptions::new().to_tab(tab_id))
        .await
        .unwrap();
    assert_eq!(pong.source, Source::Content);
    assert_eq!(pong.url.as_deref(), Some(NOTICE_URL));
}

#[tokio::test]
async fn test_analyze_from_popup() {
    let fx = fixture();
    let tab_id = fx.content.tab_id().unwrap();

    let snapshot = fx
        .popup
        .request(AnalyzeAuction, (), SendOptions::new().to_tab(tab_id))
        .await
        .unwrap();
    assert_eq!(snapshot.title, "Anunt de participare");
    assert_eq!(snapshot.url, NOTICE_URL);
}

#[tokio::test]
async fn test_highlight_from_popup() {
    let fx = fixture();
    let tab_id = fx.content.tab_id().unwrap();

    let found = HighlightRequest {
        selector: ".estimated-value".to_string(),
        color: "#FFA500".to_string(),
    };
    let missing = HighlightRequest {
        selector: "#does-not-exist".to_string(),
        color: "#FFA500".to_string(),
    };

    let ack = fx
        .popup
        .request(HighlightDocument, found, SendOptions::new().to_tab(tab_id))
        .await
        .unwrap();
    assert!(ack.success);

    let ack = fx
        .popup
        .request(HighlightDocument, missing, SendOptions::new().to_tab(tab_id))
        .await
        .unwrap();
    assert!(!ack.success);

    let highlights = fx.content.page().highlights();
    assert_eq!(highlights.len(), 1);
    assert_eq!(highlights[".estimated-value"], "#FFA500");
}

#[tokio::test]
async fn test_follows_debug_mode() {
    let fx = fixture();
    assert!(!fx.content.bus().is_debug());

    fx.popup
        .request(SetDebug, SetDebugRequest { enabled: true }, SendOptions::new())
        .await
        .unwrap();

    let bus = fx.content.bus().clone();
    eventually(move || bus.is_debug()).await;
}

#[tokio::test]
async fn test_page_script_request() {
    let fx = fixture();
    let tab_id = fx.content.tab_id().unwrap();
    let window = fx.host.window(tab_id).unwrap();
    let mut posts = window.subscribe();

    let route: RouteKey = SystemAction::Ping.into();
    let request = Message::request(Source::Content, &route, None, None, None);
    window.post_message(json!({
        "target": "naval-auction-assistant",
        "message": request.to_wire(),
    }));

    let reply = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let post = posts.recv().await.unwrap();
            if post.data["target"] == "naval-auction-assistant-page" {
                return post.data["message"].clone();
            }
        }
    })
    .await
    .unwrap();

    let reply = Message::from_wire(reply).unwrap();
    assert_eq!(reply.request_id(), Some(request.id.as_str()));
    assert_eq!(reply.payload().unwrap()["url"], NOTICE_URL);
}

#[tokio::test]
async fn test_event_to_page() {
    let fx = fixture();
    let window = fx.host.window(fx.content.tab_id().unwrap()).unwrap();
    let mut posts = window.subscribe();

    fx.content.bus().send_event(
        SystemAction::Ping,
        "auction.detailsUpdated",
        Some(json!({"lot": 1})),
        EventOptions::to_page(),
    );

    let post = tokio::time::timeout(Duration::from_secs(2), posts.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(post.data["target"], "naval-auction-assistant-page");
    let message: &Value = &post.data["message"];
    assert_eq!(message["event"], "auction.detailsUpdated");
    assert_eq!(message["data"]["lot"], 1);
}

#[tokio::test]
async fn test_start_in_missing_tab() {
    let host = ExtensionHost::new(Manifest::default());
    let err = ContentContext::start(
        host,
        12,
        PageDocument::new("about:blank", ""),
        PageTags::default(),
        BusConfig::default(),
    )
    .err()
    .unwrap();
    assert_eq!(err.code, ErrorCode::TabNotFound);
}
