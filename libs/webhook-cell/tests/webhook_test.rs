mod common;

use assert_matches::assert_matches;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

use messaging_cell::WebhookEvent;
use shared_database::{PatientRegistry, UpsertOutcome};
use shared_utils::test_utils::{sign_body, TestConfig};
use webhook_cell::router::webhook_routes;
use webhook_cell::{AdminCommand, EventOutcome, StepOutcome, WELCOME_TEXT};

use common::{harness, RecordingMessenger};

fn follow_event(user_id: &str) -> serde_json::Value {
    json!({
        "type": "follow",
        "replyToken": "reply-follow",
        "source": { "type": "user", "userId": user_id },
        "timestamp": 1714550400000u64
    })
}

fn text_event(user_id: &str, text: &str) -> serde_json::Value {
    json!({
        "type": "message",
        "replyToken": "reply-msg",
        "source": { "type": "user", "userId": user_id },
        "message": { "type": "text", "id": "1", "text": text }
    })
}

fn signed_callback(body: &serde_json::Value, secret: &str) -> Request<Body> {
    let raw = serde_json::to_vec(body).unwrap();
    Request::builder()
        .method("POST")
        .uri("/callback")
        .header("Content-Type", "application/json")
        .header("X-Line-Signature", sign_body(secret, &raw))
        .body(Body::from(raw))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let h = harness(TestConfig::default().to_app_config(), RecordingMessenger::default(), false);

    let response = webhook_routes(h.service)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_invalid_signature_is_rejected() {
    let h = harness(TestConfig::default().to_app_config(), RecordingMessenger::default(), false);
    let payload = json!({ "destination": "Ubot", "events": [follow_event("U1")] });

    let response = webhook_routes(h.service.clone())
        .oneshot(signed_callback(&payload, "some-other-secret"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(h.registry.list_patients().await.unwrap().is_empty());
    assert!(h.messenger.replies().is_empty());
}

#[tokio::test]
async fn test_follow_registers_and_welcomes() {
    let h = harness(TestConfig::default().to_app_config(), RecordingMessenger::default(), false);
    let payload = json!({ "destination": "Ubot", "events": [follow_event("U1")] });

    let response = webhook_routes(h.service.clone())
        .oneshot(signed_callback(&payload, "test-channel-secret"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let patients = h.registry.list_patients().await.unwrap();
    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].display_name, "小明");
    assert_eq!(patients[0].real_name, "");
    assert_eq!(patients[0].external_id, "U1");

    assert_eq!(
        h.messenger.replies(),
        vec![("reply-follow".to_string(), WELCOME_TEXT.to_string())]
    );
}

#[tokio::test]
async fn test_follow_continues_after_profile_failure() {
    let messenger = RecordingMessenger {
        profile_fails: true,
        ..Default::default()
    };
    let h = harness(TestConfig::default().to_app_config(), messenger, false);
    let event: WebhookEvent = serde_json::from_value(follow_event("U2")).unwrap();

    let outcome = h.service.handle_event(&event).await;

    assert_matches!(outcome, EventOutcome::Followed(follow) => {
        assert!(!follow.profile.is_done());
        assert_matches!(follow.profile, StepOutcome::Failed(_));
        assert!(follow.registry.is_done() && follow.welcome.is_done());
        assert_eq!(follow.registry, StepOutcome::Done(UpsertOutcome::Inserted));
        assert_eq!(follow.welcome, StepOutcome::Done(()));
    });
    assert_eq!(h.registry.list_patients().await.unwrap()[0].display_name, "");
}

#[tokio::test]
async fn test_admin_echo() {
    let h = harness(TestConfig::default().to_app_config(), RecordingMessenger::default(), false);

    let event: WebhookEvent = serde_json::from_value(text_event("Uadmin", "#dev  hello ")).unwrap();
    let outcome = h.service.handle_event(&event).await;
    assert_matches!(outcome, EventOutcome::AdminReplied { command: AdminCommand::Echo(_), .. });

    let event: WebhookEvent = serde_json::from_value(text_event("Uadmin", "#dev")).unwrap();
    h.service.handle_event(&event).await;

    let texts: Vec<String> = h.messenger.replies().into_iter().map(|(_, t)| t).collect();
    assert_eq!(texts, vec!["hello".to_string(), "(空訊息)".to_string()]);
}

#[tokio::test]
async fn test_admin_stats_and_preview() {
    let h = harness(TestConfig::default().to_app_config(), RecordingMessenger::default(), false);

    for text in ["#dev 統計", "#dev tomorrow"] {
        let event: WebhookEvent = serde_json::from_value(text_event("Uadmin", text)).unwrap();
        let outcome = h.service.handle_event(&event).await;
        assert_matches!(outcome, EventOutcome::AdminReplied { reply: StepOutcome::Done(()), .. });
    }

    let replies = h.messenger.replies();
    assert!(replies[0].1.contains("月的總人次\n一小時：0\n半小時：0\n45分鐘：0"));
    assert_eq!(replies[1].1, "提醒（明天行程）：\n明天沒有任何排程 ✅");
}

#[tokio::test]
async fn test_admin_stats_error_is_echoed() {
    let h = harness(TestConfig::default().to_app_config(), RecordingMessenger::default(), true);

    let event: WebhookEvent = serde_json::from_value(text_event("Uadmin", "#dev stats")).unwrap();
    h.service.handle_event(&event).await;

    let replies = h.messenger.replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].1.starts_with("統計失敗："));
}

#[tokio::test]
async fn test_non_admin_and_unprefixed_messages_are_ignored() {
    let h = harness(TestConfig::default().to_app_config(), RecordingMessenger::default(), false);

    let event: WebhookEvent = serde_json::from_value(text_event("Upatient", "#dev 統計")).unwrap();
    assert_matches!(h.service.handle_event(&event).await, EventOutcome::Ignored(_));

    let event: WebhookEvent = serde_json::from_value(text_event("Uadmin", "統計")).unwrap();
    assert_matches!(h.service.handle_event(&event).await, EventOutcome::Ignored(_));

    assert!(h.messenger.replies().is_empty());
}

#[tokio::test]
async fn test_malformed_payload_with_valid_signature() {
    let h = harness(TestConfig::default().to_app_config(), RecordingMessenger::default(), false);
    let raw = b"not json".to_vec();

    let request = Request::builder()
        .method("POST")
        .uri("/callback")
        .header("X-Line-Signature", sign_body("test-channel-secret", &raw))
        .body(Body::from(raw))
        .unwrap();

    let response = webhook_routes(h.service).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
