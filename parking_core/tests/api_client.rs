mod common;

use std::rc::Rc;

use common::{init_logger, FakeProvider, FakeTokens, FakeTransport};
use parking_core::api::models::{RequestsPatch, StayInterruptedPatch};
use parking_core::api::{ApiClient, Method, ParkingApi};
use parking_core::calendar::RequestEdits;
use parking_core::error::ApiError;
use parking_core::session::SessionManager;
use serde_json::json;

const BASE: &str = "https://api.parking.test/";

fn api(transport: &Rc<FakeTransport>, token: Option<&str>) -> ParkingApi<Rc<FakeTransport>, FakeTokens> {
    init_logger();
    ParkingApi::new(ApiClient::new(BASE, transport.clone(), FakeTokens(token.map(str::to_string))))
}

const REQUESTS: &str = r#"{ "requests": { "weeks": [ { "days": [
    { "localDate": "2024-06-01", "hidden": true },
    { "localDate": "2024-06-03", "hidden": false, "data": { "requested": false } },
    { "localDate": "2024-06-04", "hidden": false, "data": { "requested": false } }
] } ] } }"#;

#[tokio::test]
async fn bearer_token_is_attached() {
    let transport = Rc::new(FakeTransport::new());
    transport.respond(200, REQUESTS);

    let response = api(&transport, Some("abc")).requests().await.unwrap();

    assert_eq!(response.requests.editable_days().count(), 2);
    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, Method::Get);
    assert_eq!(sent[0].url, "https://api.parking.test/requests");
    assert_eq!(sent[0].header_value("Authorization"), Some("Bearer abc"));
}

#[tokio::test]
async fn missing_token_short_circuits_before_the_network() {
    let transport = Rc::new(FakeTransport::new());
    transport.respond(200, REQUESTS);

    let err = api(&transport, None).requests().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthenticated));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn signed_out_session_is_not_a_token_source() {
    let transport = Rc::new(FakeTransport::new());
    let session = Rc::new(SessionManager::new(Rc::new(FakeProvider::default())));
    session.initialize().await;
    let api = ParkingApi::new(ApiClient::new(BASE, transport.clone(), session.clone()));

    assert!(matches!(api.summary().await, Err(ApiError::Unauthenticated)));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn save_sends_only_the_diff() {
    let transport = Rc::new(FakeTransport::new());
    transport.respond(200, REQUESTS);
    let api = api(&transport, Some("abc"));

    let response = api.requests().await.unwrap();
    let mut edits = RequestEdits::from_dataset(&response.requests).unwrap();
    edits.set_value("2024-06-03".parse().unwrap(), true).unwrap();

    let body = RequestsPatch::from_diff(edits.begin_save().unwrap());
    transport.respond(200, &REQUESTS.replacen(r#""requested": false"#, r#""requested": true"#, 1));
    let saved = api.edit_requests(&body).await.unwrap();
    edits.complete_save_with(Ok(&saved.requests)).unwrap();

    let sent = transport.requests();
    assert_eq!(sent[1].method, Method::Patch);
    assert_eq!(sent[1].header_value("content-type"), Some("application/json"));
    assert_eq!(
        transport.last_body(),
        json!({ "requests": [{ "localDate": "2024-06-03", "requested": true }] })
    );
    assert!(!edits.is_dirty());
    assert_eq!(edits.baseline_value("2024-06-03".parse().unwrap()), Some(&true));
}

#[tokio::test]
async fn server_rejection_carries_status_and_message() {
    let transport = Rc::new(FakeTransport::new());
    transport.respond(400, r#"{ "message": "Cannot edit past dates" }"#);

    let body = StayInterruptedPatch { local_date: "2024-06-03".parse().unwrap(), stay_interrupted: true };
    let err = api(&transport, Some("abc")).stay_interrupted(&body).await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "HTTP 400 – Cannot edit past dates");
    assert_eq!(transport.requests()[0].url, "https://api.parking.test/dailyDetails");
}

#[tokio::test]
async fn transport_failure_and_bad_json_are_distinct() {
    let transport = Rc::new(FakeTransport::new());
    transport.fail("offline");
    transport.respond(200, "not json");
    let api = api(&transport, Some("abc"));

    assert!(matches!(api.profile().await, Err(ApiError::Transport(_))));
    assert!(matches!(api.profile().await, Err(ApiError::Json(_))));
}

#[tokio::test]
async fn delete_accepts_an_empty_body() {
    let transport = Rc::new(FakeTransport::new());
    transport.respond(204, "");

    api(&transport, Some("abc")).delete_user("u-1").await.unwrap();

    let sent = transport.requests();
    assert_eq!(sent[0].method, Method::Delete);
    assert_eq!(sent[0].url, "https://api.parking.test/users/u-1");
    assert!(sent[0].body.is_none());
}

#[tokio::test]
async fn registration_search_is_sanitized() {
    let transport = Rc::new(FakeTransport::new());
    transport.respond(200, r#"{ "registrationNumbers": [ { "registrationNumber": "AB12CDE", "name": "Ada" } ] }"#);
    let api = api(&transport, Some("abc"));

    assert_eq!(api.registration_numbers(" -/ ").await.unwrap(), None);
    assert!(transport.requests().is_empty());

    let found = api.registration_numbers("ab12 cde").await.unwrap().unwrap();
    assert_eq!(found.registration_numbers[0].name, "Ada");
    assert_eq!(transport.requests()[0].url, "https://api.parking.test/registrationNumbers/ab12cde");
}

#[tokio::test]
async fn override_requests_target_the_user() {
    let transport = Rc::new(FakeTransport::new());
    transport.respond(200, REQUESTS);
    transport.respond(200, REQUESTS);
    let api = api(&transport, Some("abc"));

    api.user_requests("u-7").await.unwrap();
    api.edit_user_requests("u-7", &RequestsPatch::from_diff(Vec::new())).await.unwrap();

    let urls: Vec<_> = transport.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(urls, vec!["https://api.parking.test/requests/u-7", "https://api.parking.test/requests/u-7"]);
}
