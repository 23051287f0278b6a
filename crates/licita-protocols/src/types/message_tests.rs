use super::*;
use crate::error::ErrorCode;
use crate::types::{DocumentAction, SystemAction};
use serde_json::json;

#[test]
fn test_request_wire_shape() {
    let route: RouteKey = SystemAction::Ping.into();
    let msg = Message::request(Source::Popup, &route, None, Some(7), Some(2000));
    let wire = msg.to_wire();

    assert_eq!(wire["type"], "request");
    assert_eq!(wire["source"], "popup");
    assert_eq!(wire["category"], "system");
    assert_eq!(wire["action"], "ping");
    assert_eq!(wire["tabId"], 7);
    assert_eq!(wire["timeout"], 2000);
    assert!(wire.get("data").is_none());
    assert!(wire["timestamp"].as_i64().unwrap() > 0);
}

#[test]
fn test_request_from_original_wire_format() {
    let wire = json!({
        "id": "abc",
        "source": "content",
        "type": "request",
        "timestamp": 1700000000000i64,
        "category": "document",
        "action": "fetch",
        "data": {"documentId": "x"}
    });
    let msg = Message::from_wire(wire).unwrap();
    assert_eq!(msg.kind(), MessageKind::Request);
    assert_eq!(msg.route(), DocumentAction::Fetch.into());
    match msg.body {
        MessageBody::Request(body) => {
            assert_eq!(body.payload, Some(json!({"documentId": "x"})));
            assert_eq!(body.tab_id, None);
        }
        other => panic!("expected request, got {:?}", other),
    }
}

#[test]
fn test_response_correlates_to_request() {
    let route: RouteKey = SystemAction::GetStatus.into();
    let request = Message::request(Source::Popup, &route, None, None, None);
    let response = Message::response_to(&request, Source::Background, json!({"ok": true}));

    assert_ne!(response.id, request.id);
    assert_eq!(response.request_id(), Some(request.id.as_str()));
    assert_eq!(response.route(), route);

    let parsed = Message::from_wire(response.to_wire()).unwrap();
    assert_eq!(parsed, response);
}

#[test]
fn test_response_with_null_payload() {
    let route: RouteKey = SystemAction::Log.into();
    let request = Message::request(Source::Content, &route, None, None, None);
    let response = Message::response_to(&request, Source::Background, Value::Null);
    let parsed = Message::from_wire(response.to_wire()).unwrap();
    match parsed.body {
        MessageBody::Response(body) => assert!(body.payload.is_null()),
        other => panic!("expected response, got {:?}", other),
    }
}

#[test]
fn test_error_wire_shape() {
    let route: RouteKey = DocumentAction::Fetch.into();
    let request = Message::request(Source::Popup, &route, None, None, None);
    let err = MessagingError::action_failed("not implemented");
    let reply = Message::error_for(&request, Source::Background, err);
    let wire = reply.to_wire();

    assert_eq!(wire["type"], "error");
    assert_eq!(wire["requestId"], request.id.as_str());
    assert_eq!(wire["error"]["code"], "ACTION_FAILED");
    assert_eq!(wire["error"]["message"], "not implemented");

    let parsed = Message::from_wire(wire).unwrap();
    match parsed.body {
        MessageBody::Error(body) => assert_eq!(body.error.code, ErrorCode::ActionFailed),
        other => panic!("expected error, got {:?}", other),
    }
}

#[test]
fn test_event_has_no_correlation() {
    let route: RouteKey = SystemAction::SetDebug.into();
    let msg = Message::event(Source::Background, &route, "debug.modeChanged", Some(json!({"enabled": true})));
    let wire = msg.to_wire();
    assert_eq!(wire["type"], "event");
    assert_eq!(wire["event"], "debug.modeChanged");
    assert!(wire.get("requestId").is_none());
    assert_eq!(msg.request_id(), None);
}

#[test]
fn test_from_wire_rejects_missing_common_fields() {
    let missing_source = json!({
        "id": "1", "type": "request", "timestamp": 1, "category": "system", "action": "ping"
    });
    let err = Message::from_wire(missing_source).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidMessage);

    let missing_type = json!({
        "id": "1", "source": "popup", "timestamp": 1, "category": "system", "action": "ping"
    });
    assert!(Message::from_wire(missing_type).is_err());
}

#[test]
fn test_from_wire_rejects_foreign_broadcasts() {
    assert!(Message::from_wire(json!({"greeting": "hello"})).is_err());
    assert!(Message::from_wire(json!("string")).is_err());
    assert!(Message::from_wire(Value::Null).is_err());
}

#[test]
fn test_from_wire_rejects_empty_id() {
    let wire = json!({
        "id": "", "source": "popup", "type": "event", "timestamp": 1,
        "category": "system", "action": "ping", "event": "x"
    });
    assert!(Message::from_wire(wire).is_err());
}

#[test]
fn test_from_wire_rejects_unknown_category() {
    let wire = json!({
        "id": "1", "source": "popup", "type": "request", "timestamp": 1,
        "category": "billing", "action": "charge"
    });
    assert!(Message::from_wire(wire).is_err());
}

#[test]
fn test_unknown_action_is_still_parsed() {
    let wire = json!({
        "id": "1", "source": "popup", "type": "request", "timestamp": 1,
        "category": "system", "action": "reboot"
    });
    let msg = Message::from_wire(wire).unwrap();
    assert!(!msg.route().is_known());
}

#[test]
fn test_summary() {
    let route: RouteKey = SystemAction::Ping.into();
    let msg = Message::request(Source::Content, &route, None, None, None);
    let summary = msg.summary();
    assert!(summary.starts_with("request "));
    assert!(summary.contains("system:ping"));
    assert!(summary.ends_with("from content"));
}
