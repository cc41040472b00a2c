//! Scripted stand-ins for the identity provider, the HTTP stack and the
//! breach service.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};

use parking_core::api::{HttpRequest, HttpResponse, HttpTransport, TokenSource};
use parking_core::error::{IdentityError, TransportError};
use parking_core::password::BreachChecker;
use parking_core::session::{IdentityProvider, SignInResult};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// JWT carrying the given groups and first name, signed with a key the
/// client never sees.
pub fn jwt(groups: &[&str], given_name: &str) -> String {
    let payload = serde_json::json!({ "cognito:groups": groups, "given_name": given_name });
    encode(&Header::default(), &payload, &EncodingKey::from_secret(b"server-only")).unwrap()
}

/* ---------------- identity provider ------------------------------------- */

pub struct FakeProvider {
    pub session_live:    Cell<bool>,
    /// Makes `sign_in` give the executor back once before answering.
    pub yield_sign_in:   Cell<bool>,
    pub yield_confirm:   Cell<bool>,
    pub token:           RefCell<Result<String, IdentityError>>,
    pub sign_in_results: RefCell<VecDeque<Result<SignInResult, IdentityError>>>,
    pub confirm_results: RefCell<VecDeque<Result<SignInResult, IdentityError>>>,
    pub sign_out_result: RefCell<Result<(), IdentityError>>,
    pub reset_result:    RefCell<Result<(), IdentityError>>,
    pub calls:           RefCell<Vec<String>>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            session_live:    Cell::new(false),
            yield_sign_in:   Cell::new(false),
            yield_confirm:   Cell::new(false),
            token:           RefCell::new(Ok(jwt(&[], ""))),
            sign_in_results: RefCell::new(VecDeque::new()),
            confirm_results: RefCell::new(VecDeque::new()),
            sign_out_result: RefCell::new(Ok(())),
            reset_result:    RefCell::new(Ok(())),
            calls:           RefCell::new(Vec::new()),
        }
    }
}

impl FakeProvider {
    pub fn with_session(token: &str) -> Self {
        let provider = Self::default();
        provider.session_live.set(true);
        *provider.token.borrow_mut() = Ok(token.to_string());
        provider
    }

    pub fn script_sign_in(&self, result: Result<SignInResult, IdentityError>) {
        self.sign_in_results.borrow_mut().push_back(result);
    }

    pub fn script_confirm(&self, result: Result<SignInResult, IdentityError>) {
        self.confirm_results.borrow_mut().push_back(result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: &str) {
        self.calls.borrow_mut().push(call.to_string());
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FakeProvider {
    async fn sign_in(&self, identifier: &str, _secret: &str) -> Result<SignInResult, IdentityError> {
        self.record(&format!("sign_in:{identifier}"));
        if self.yield_sign_in.get() {
            tokio::task::yield_now().await;
        }
        let result = self
            .sign_in_results
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(SignInResult::signed_in()));
        if matches!(result, Ok(SignInResult { is_signed_in: true, .. })) {
            self.session_live.set(true);
        }
        result
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.record("sign_out");
        self.session_live.set(false);
        self.sign_out_result.borrow().clone()
    }

    async fn get_current_session(&self) -> Result<(), IdentityError> {
        self.record("get_current_session");
        if self.session_live.get() {
            Ok(())
        } else {
            Err(IdentityError::NoSession)
        }
    }

    async fn fetch_token(&self) -> Result<String, IdentityError> {
        self.record("fetch_token");
        self.token.borrow().clone()
    }

    async fn confirm_sign_in(&self, _secret: &str) -> Result<SignInResult, IdentityError> {
        self.record("confirm_sign_in");
        if self.yield_confirm.get() {
            tokio::task::yield_now().await;
        }
        let result = self
            .confirm_results
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(SignInResult::signed_in()));
        if matches!(result, Ok(SignInResult { is_signed_in: true, .. })) {
            self.session_live.set(true);
        }
        result
    }

    async fn reset_password_request(&self, identifier: &str) -> Result<(), IdentityError> {
        self.record(&format!("reset_password_request:{identifier}"));
        self.reset_result.borrow().clone()
    }

    async fn confirm_password_reset(
        &self,
        identifier: &str,
        code: &str,
        _new_secret: &str,
    ) -> Result<(), IdentityError> {
        self.record(&format!("confirm_password_reset:{identifier}:{code}"));
        self.reset_result.borrow().clone()
    }
}

/* ---------------- HTTP ------------------------------------------------- */

#[derive(Default)]
pub struct FakeTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
    requests:  RefCell<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.responses
            .borrow_mut()
            .push_back(Ok(HttpResponse { status, body: body.to_string() }));
    }

    pub fn fail(&self, message: &str) {
        self.responses.borrow_mut().push_back(Err(TransportError(message.to_string())));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_body(&self) -> serde_json::Value {
        let requests = self.requests.borrow();
        let body = requests.last().and_then(|r| r.body.clone()).unwrap_or_default();
        serde_json::from_str(&body).unwrap_or(serde_json::Value::Null)
    }
}

#[async_trait(?Send)]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted response".into())))
    }
}

/* ---------------- jetons, fuites ---------------------------------------- */

pub struct FakeTokens(pub Option<String>);

#[async_trait(?Send)]
impl TokenSource for FakeTokens {
    async fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

pub struct FixedBreach(pub Result<u64, TransportError>);

#[async_trait(?Send)]
impl BreachChecker for FixedBreach {
    async fn breach_count(&self, _secret: &str) -> Result<u64, TransportError> {
        self.0.clone()
    }
}

pub const NO_BREACH: FixedBreach = FixedBreach(Ok(0));
