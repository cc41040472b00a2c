//! Cognito user-pool client speaking the JSON protocol directly.
//!
//! Tokens are kept in a `TokenStore`; the browser build backs it with
//! `sessionStorage` so nothing outlives the tab.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{HttpRequest, HttpResponse, HttpTransport};
use crate::config::CognitoConfig;
use crate::error::{ConfigError, IdentityError};
use crate::session::provider::{IdentityProvider, SignInResult};

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const AMZ_JSON: &str = "application/x-amz-json-1.1";
const NEW_PASSWORD_REQUIRED: &str = "NEW_PASSWORD_REQUIRED";

/// Tokens are refreshed this many seconds before they actually expire.
const EXPIRY_LEEWAY_SECS: i64 = 60;

/* ---------------- stockage des jetons ----------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTokens {
    pub id_token:      String,
    pub access_token:  String,
    pub refresh_token: Option<String>,
    /// Unix seconds.
    pub expires_at:    i64,
}

impl StoredTokens {
    pub fn is_expired(&self, now: i64) -> bool {
        now + EXPIRY_LEEWAY_SECS >= self.expires_at
    }
}

pub trait TokenStore {
    fn load(&self) -> Option<StoredTokens>;
    fn save(&self, tokens: &StoredTokens);
    fn clear(&self);
}

impl<S: TokenStore + ?Sized> TokenStore for Rc<S> {
    fn load(&self) -> Option<StoredTokens> {
        (**self).load()
    }

    fn save(&self, tokens: &StoredTokens) {
        (**self).save(tokens)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RefCell<Option<StoredTokens>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<StoredTokens> {
        self.tokens.borrow().clone()
    }

    fn save(&self, tokens: &StoredTokens) {
        *self.tokens.borrow_mut() = Some(tokens.clone());
    }

    fn clear(&self) {
        self.tokens.borrow_mut().take();
    }
}

/* ---------------- réponses Cognito -------------------------------------- */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    id_token:      String,
    access_token:  String,
    refresh_token: Option<String>,
    expires_in:    i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name:        Option<String>,
    session:               Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    kind:    Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

#[derive(Debug, Clone)]
struct PendingChallenge {
    username: String,
    session:  String,
}

/* ---------------- provider ---------------------------------------------- */

pub struct CognitoIdentityProvider<T, S> {
    transport: T,
    store:     S,
    endpoint:  String,
    client_id: String,
    pending:   RefCell<Option<PendingChallenge>>,
}

impl<T: HttpTransport, S: TokenStore> CognitoIdentityProvider<T, S> {
    pub fn new(config: &CognitoConfig, transport: T, store: S) -> Result<Self, ConfigError> {
        Ok(Self {
            transport,
            store,
            endpoint:  config.endpoint()?,
            client_id: config.client_id.clone(),
            pending:   RefCell::new(None),
        })
    }

    async fn call<R: DeserializeOwned>(&self, action: &str, body: Value) -> Result<R, IdentityError> {
        let request = HttpRequest::post(&self.endpoint)
            .header("Content-Type", AMZ_JSON)
            .header("X-Amz-Target", &format!("{TARGET_PREFIX}.{action}"))
            .with_body(body.to_string());

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(rejection(&response));
        }

        let text = if response.body.trim().is_empty() { "{}" } else { response.body.as_str() };
        serde_json::from_str(text)
            .map_err(|e| IdentityError::Protocol(format!("{action}: {e}")))
    }

    fn store_result(&self, result: AuthenticationResult, previous_refresh: Option<String>) {
        let tokens = StoredTokens {
            id_token:      result.id_token,
            access_token:  result.access_token,
            refresh_token: result.refresh_token.or(previous_refresh),
            expires_at:    Utc::now().timestamp() + result.expires_in,
        };
        self.store.save(&tokens);
    }

    /// Handles the answer of `InitiateAuth` / `RespondToAuthChallenge`.
    fn finish_auth(&self, username: &str, response: AuthResponse) -> Result<SignInResult, IdentityError> {
        if let Some(result) = response.authentication_result {
            self.pending.borrow_mut().take();
            self.store_result(result, None);
            return Ok(SignInResult::signed_in());
        }

        match (response.challenge_name.as_deref(), response.session) {
            (Some(NEW_PASSWORD_REQUIRED), Some(session)) => {
                *self.pending.borrow_mut() = Some(PendingChallenge {
                    username: username.to_string(),
                    session,
                });
                Ok(SignInResult::new_password_required())
            }
            (Some(other), _) => Err(IdentityError::UnsupportedChallenge(other.to_string())),
            (None, _) => Err(IdentityError::Protocol(
                "neither tokens nor a challenge in response".into(),
            )),
        }
    }

    /// Live tokens, refreshed when they are about to expire.
    async fn current_tokens(&self) -> Result<StoredTokens, IdentityError> {
        let tokens = self.store.load().ok_or(IdentityError::NoSession)?;
        if !tokens.is_expired(Utc::now().timestamp()) {
            return Ok(tokens);
        }

        let Some(refresh_token) = tokens.refresh_token.clone() else {
            self.store.clear();
            return Err(IdentityError::NoSession);
        };

        debug!("id token expired, refreshing");
        let body = json!({
            "AuthFlow": "REFRESH_TOKEN_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": { "REFRESH_TOKEN": refresh_token },
        });

        match self.call::<AuthResponse>("InitiateAuth", body).await {
            Ok(AuthResponse { authentication_result: Some(result), .. }) => {
                self.store_result(result, Some(refresh_token));
                self.store.load().ok_or(IdentityError::NoSession)
            }
            Ok(_) => {
                self.store.clear();
                Err(IdentityError::Protocol("refresh returned no tokens".into()))
            }
            Err(IdentityError::Rejected { code, .. }) => {
                warn!("refresh token rejected ({code})");
                self.store.clear();
                Err(IdentityError::NoSession)
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait(?Send)]
impl<T: HttpTransport, S: TokenStore> IdentityProvider for CognitoIdentityProvider<T, S> {
    async fn sign_in(&self, identifier: &str, secret: &str) -> Result<SignInResult, IdentityError> {
        let body = json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": { "USERNAME": identifier, "PASSWORD": secret },
        });
        let response = self.call::<AuthResponse>("InitiateAuth", body).await?;
        self.finish_auth(identifier, response)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.pending.borrow_mut().take();
        let Some(tokens) = self.store.load() else {
            return Ok(());
        };
        // local tokens go first, the remote revocation is best effort
        self.store.clear();

        self.call::<Value>("GlobalSignOut", json!({ "AccessToken": tokens.access_token }))
            .await
            .map(|_| ())
    }

    async fn get_current_session(&self) -> Result<(), IdentityError> {
        self.current_tokens().await.map(|_| ())
    }

    async fn fetch_token(&self) -> Result<String, IdentityError> {
        self.current_tokens().await.map(|t| t.id_token)
    }

    async fn confirm_sign_in(&self, secret: &str) -> Result<SignInResult, IdentityError> {
        let pending = self
            .pending
            .borrow()
            .clone()
            .ok_or_else(|| IdentityError::Protocol("no challenge to answer".into()))?;

        let body = json!({
            "ChallengeName": NEW_PASSWORD_REQUIRED,
            "ClientId": self.client_id,
            "Session": pending.session,
            "ChallengeResponses": { "USERNAME": pending.username, "NEW_PASSWORD": secret },
        });
        let response = self.call::<AuthResponse>("RespondToAuthChallenge", body).await?;
        self.finish_auth(&pending.username, response)
    }

    async fn reset_password_request(&self, identifier: &str) -> Result<(), IdentityError> {
        let body = json!({ "ClientId": self.client_id, "Username": identifier });
        self.call::<Value>("ForgotPassword", body).await.map(|_| ())
    }

    async fn confirm_password_reset(
        &self,
        identifier: &str,
        code: &str,
        new_secret: &str,
    ) -> Result<(), IdentityError> {
        let body = json!({
            "ClientId": self.client_id,
            "Username": identifier,
            "ConfirmationCode": code,
            "Password": new_secret,
        });
        self.call::<Value>("ConfirmForgotPassword", body).await.map(|_| ())
    }
}

/// `{"__type":"com.amazon…#NotAuthorizedException","message":"…"}` → Rejected.
fn rejection(response: &HttpResponse) -> IdentityError {
    let body: ErrorBody = serde_json::from_str(&response.body)
        .unwrap_or(ErrorBody { kind: None, message: None });

    let code = body
        .kind
        .as_deref()
        .map(|k| k.rsplit('#').next().unwrap_or(k).to_string())
        .unwrap_or_else(|| format!("HTTP {}", response.status));

    IdentityError::Rejected { code, message: body.message }
}
