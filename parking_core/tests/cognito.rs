mod common;

use std::rc::Rc;

use chrono::Utc;
use common::{init_logger, FakeTransport};
use parking_core::config::CognitoConfig;
use parking_core::error::IdentityError;
use parking_core::session::cognito::{CognitoIdentityProvider, MemoryTokenStore, StoredTokens, TokenStore};
use parking_core::session::{IdentityProvider, SessionManager, SessionStatus, SignInResult};
use serde_json::json;

type Provider = CognitoIdentityProvider<Rc<FakeTransport>, Rc<MemoryTokenStore>>;

fn provider() -> (Provider, Rc<FakeTransport>, Rc<MemoryTokenStore>) {
    init_logger();
    let config = CognitoConfig { user_pool_id: "eu-west-2_Pool1".into(), client_id: "client-1".into() };
    let transport = Rc::new(FakeTransport::new());
    let store = Rc::new(MemoryTokenStore::new());
    let provider = CognitoIdentityProvider::new(&config, transport.clone(), store.clone()).unwrap();
    (provider, transport, store)
}

fn auth_result(id: &str, refresh: Option<&str>) -> String {
    let mut result = json!({ "IdToken": id, "AccessToken": format!("access-{id}"), "ExpiresIn": 3600, "TokenType": "Bearer" });
    if let Some(refresh) = refresh {
        result["RefreshToken"] = json!(refresh);
    }
    json!({ "AuthenticationResult": result, "ChallengeParameters": {} }).to_string()
}

fn expired(refresh: Option<&str>) -> StoredTokens {
    StoredTokens {
        id_token:      "old-id".into(),
        access_token:  "old-access".into(),
        refresh_token: refresh.map(str::to_string),
        expires_at:    Utc::now().timestamp() - 10,
    }
}

#[tokio::test]
async fn password_sign_in_stores_tokens() {
    let (provider, transport, store) = provider();
    transport.respond(200, &auth_result("id-1", Some("refresh-1")));

    let result = provider.sign_in("ada", "secret").await.unwrap();

    assert_eq!(result, SignInResult::signed_in());
    let sent = &transport.requests()[0];
    assert_eq!(sent.url, "https://cognito-idp.eu-west-2.amazonaws.com/");
    assert_eq!(sent.header_value("X-Amz-Target"), Some("AWSCognitoIdentityProviderService.InitiateAuth"));
    assert_eq!(sent.header_value("Content-Type"), Some("application/x-amz-json-1.1"));
    assert_eq!(
        transport.last_body(),
        json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": "client-1",
            "AuthParameters": { "USERNAME": "ada", "PASSWORD": "secret" }
        })
    );

    assert_eq!(provider.fetch_token().await.unwrap(), "id-1");
    assert_eq!(store.load().and_then(|t| t.refresh_token).as_deref(), Some("refresh-1"));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn new_password_challenge_round_trip() {
    let (provider, transport, _store) = provider();
    transport.respond(200, r#"{ "ChallengeName": "NEW_PASSWORD_REQUIRED", "Session": "sess-1", "ChallengeParameters": {} }"#);
    transport.respond(200, &auth_result("id-2", Some("refresh-2")));

    assert_eq!(provider.sign_in("ada", "temporary").await.unwrap(), SignInResult::new_password_required());
    assert!(matches!(provider.get_current_session().await, Err(IdentityError::NoSession)));

    assert_eq!(provider.confirm_sign_in("Sturdy-Passw0rd!").await.unwrap(), SignInResult::signed_in());
    let sent = transport.requests();
    assert_eq!(
        sent[1].header_value("X-Amz-Target"),
        Some("AWSCognitoIdentityProviderService.RespondToAuthChallenge")
    );
    assert_eq!(
        transport.last_body(),
        json!({
            "ChallengeName": "NEW_PASSWORD_REQUIRED",
            "ClientId": "client-1",
            "Session": "sess-1",
            "ChallengeResponses": { "USERNAME": "ada", "NEW_PASSWORD": "Sturdy-Passw0rd!" }
        })
    );
    assert_eq!(provider.fetch_token().await.unwrap(), "id-2");
}

#[tokio::test]
async fn confirm_without_challenge_sends_nothing() {
    let (provider, transport, _store) = provider();
    assert!(matches!(provider.confirm_sign_in("x").await, Err(IdentityError::Protocol(_))));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn unknown_challenge_is_reported() {
    let (provider, transport, _store) = provider();
    transport.respond(200, r#"{ "ChallengeName": "SMS_MFA", "Session": "s" }"#);
    assert_eq!(
        provider.sign_in("ada", "secret").await,
        Err(IdentityError::UnsupportedChallenge("SMS_MFA".into()))
    );
}

#[tokio::test]
async fn bad_credentials_are_rejected_with_message() {
    let (provider, transport, store) = provider();
    transport.respond(
        400,
        r#"{ "__type": "NotAuthorizedException", "message": "Incorrect username or password." }"#,
    );

    let err = provider.sign_in("ada", "bad").await.unwrap_err();

    assert_eq!(
        err,
        IdentityError::Rejected {
            code:    "NotAuthorizedException".into(),
            message: Some("Incorrect username or password.".into()),
        }
    );
    assert!(store.load().is_none());
}

#[tokio::test]
async fn expired_tokens_are_refreshed() {
    let (provider, transport, store) = provider();
    store.save(&expired(Some("refresh-1")));
    transport.respond(200, &auth_result("id-3", None));

    assert_eq!(provider.fetch_token().await.unwrap(), "id-3");

    assert_eq!(
        transport.last_body(),
        json!({
            "AuthFlow": "REFRESH_TOKEN_AUTH",
            "ClientId": "client-1",
            "AuthParameters": { "REFRESH_TOKEN": "refresh-1" }
        })
    );
    // Cognito does not send the refresh token back on refresh
    assert_eq!(store.load().and_then(|t| t.refresh_token).as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn rejected_refresh_ends_the_session() {
    let (provider, transport, store) = provider();
    store.save(&expired(Some("revoked")));
    transport.respond(400, r#"{ "__type": "NotAuthorizedException", "message": "Refresh Token has been revoked" }"#);

    assert_eq!(provider.fetch_token().await, Err(IdentityError::NoSession));
    assert!(store.load().is_none());

    store.save(&expired(None));
    assert_eq!(provider.get_current_session().await, Err(IdentityError::NoSession));
    assert!(store.load().is_none());
}

#[tokio::test]
async fn refresh_outage_keeps_tokens() {
    let (provider, transport, store) = provider();
    store.save(&expired(Some("refresh-1")));
    transport.fail("offline");

    assert!(matches!(provider.fetch_token().await, Err(IdentityError::Transport(_))));
    assert!(store.load().is_some());
}

#[tokio::test]
async fn sign_out_clears_tokens_even_if_revocation_fails() {
    let (provider, transport, store) = provider();
    transport.respond(200, &auth_result("id-1", Some("refresh-1")));
    provider.sign_in("ada", "secret").await.unwrap();
    transport.respond(500, "");

    assert!(provider.sign_out().await.is_err());

    assert_eq!(transport.last_body(), json!({ "AccessToken": "access-id-1" }));
    assert!(store.load().is_none());
    assert!(matches!(provider.fetch_token().await, Err(IdentityError::NoSession)));
}

#[tokio::test]
async fn password_reset_wire_bodies() {
    let (provider, transport, _store) = provider();
    transport.respond(200, r#"{ "CodeDeliveryDetails": { "DeliveryMedium": "EMAIL" } }"#);
    transport.respond(200, "");

    provider.reset_password_request("ada").await.unwrap();
    assert_eq!(transport.last_body(), json!({ "ClientId": "client-1", "Username": "ada" }));

    provider.confirm_password_reset("ada", "123456", "Sturdy-Passw0rd!").await.unwrap();
    let sent = transport.requests();
    assert_eq!(
        sent[1].header_value("X-Amz-Target"),
        Some("AWSCognitoIdentityProviderService.ConfirmForgotPassword")
    );
    assert_eq!(
        transport.last_body(),
        json!({
            "ClientId": "client-1",
            "Username": "ada",
            "ConfirmationCode": "123456",
            "Password": "Sturdy-Passw0rd!"
        })
    );
}

#[tokio::test]
async fn session_manager_over_cognito() {
    let (provider, transport, _store) = provider();
    let session = SessionManager::new(Rc::new(provider));
    session.initialize().await;
    assert_eq!(session.status(), SessionStatus::Unauthenticated);
    assert!(transport.requests().is_empty());

    transport.respond(200, &auth_result("id-9", Some("refresh-9")));
    session.login("ada", "secret").await.unwrap();

    assert_eq!(session.status(), SessionStatus::Authenticated);
    assert_eq!(session.get_token().await.as_deref(), Some("id-9"));

    transport.respond(200, "{}");
    session.logout().await;
    assert_eq!(session.get_token().await, None);
}
