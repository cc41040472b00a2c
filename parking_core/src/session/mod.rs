//! Client session lifecycle on top of an external identity provider.
//!
//! `SessionManager` is built once at startup with its provider and handed to
//! whoever needs it (claims resolver, API client, UI providers). All status
//! changes go through it; observers are notified through `subscribe`.

pub mod cognito;
pub mod provider;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use log::{debug, error, info, warn};

use crate::api::TokenSource;
use crate::error::{
    AuthError, IdentityError, LOGIN_FAILED, RESET_PASSWORD_FAILED, RESET_REQUEST_FAILED,
    SET_PASSWORD_FAILED,
};
use crate::password::{validate_new_password, BreachChecker};

pub use provider::{IdentityProvider, SignInResult, SignInStep};

/* ---------------- état de session --------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeKind {
    NewPassword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Unauthenticated,
    Authenticated,
    /// Sign-in started but the provider wants another step first. No bearer
    /// token is handed out in this state.
    PendingChallenge(ChallengeKind),
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Unauthenticated => f.write_str("unauthenticated"),
            SessionStatus::Authenticated => f.write_str("authenticated"),
            SessionStatus::PendingChallenge(ChallengeKind::NewPassword) => {
                f.write_str("pending challenge (new password)")
            }
        }
    }
}

pub type SessionListener = Rc<dyn Fn(SessionStatus)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/* ---------------- manager ----------------------------------------------- */

pub struct SessionManager {
    provider:      Rc<dyn IdentityProvider>,
    status:        Cell<SessionStatus>,
    initialized:   Cell<bool>,
    /// Bumped by every status-changing operation when it starts. A
    /// completion only writes if its epoch is still the latest one.
    epoch:         Cell<u64>,
    listeners:     RefCell<Vec<(SubscriptionId, SessionListener)>>,
    next_listener: Cell<u64>,
}

impl SessionManager {
    pub fn new(provider: Rc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            status:        Cell::new(SessionStatus::Unauthenticated),
            initialized:   Cell::new(false),
            epoch:         Cell::new(0),
            listeners:     RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    /// False until the first look at the provider has completed.
    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    pub fn subscribe(&self, listener: SessionListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.borrow_mut().retain(|(other, _)| *other != id);
    }

    /* ---------- cycle de vie ---------- */

    /// Probes the provider once at startup. Guarded UI must not render before
    /// this returns.
    pub async fn initialize(&self) {
        self.check_live_session().await;
        if !self.initialized.replace(true) {
            info!("session initialized: {}", self.status());
            // listeners waiting for the first check get told even when the
            // status did not move away from its default
            self.notify(self.status());
        }
    }

    /// Re-runs the live-session check, e.g. after credentials changed out of
    /// band.
    pub async fn refresh(&self) {
        self.check_live_session().await;
    }

    pub async fn login(&self, identifier: &str, secret: &str) -> Result<SignInResult, AuthError> {
        let epoch = self.begin();

        match self.provider.sign_in(identifier, secret).await {
            Ok(result) => {
                let status = match (result.is_signed_in, result.next_step) {
                    (true, _) => SessionStatus::Authenticated,
                    (false, SignInStep::ConfirmSignInWithNewPassword) => {
                        SessionStatus::PendingChallenge(ChallengeKind::NewPassword)
                    }
                    (false, SignInStep::Done) => SessionStatus::Unauthenticated,
                };
                self.apply(epoch, status);
                Ok(result)
            }
            Err(err) => {
                warn!("sign-in failed: {err}");
                self.apply(epoch, SessionStatus::Unauthenticated);
                Err(AuthError::from_identity(&err, LOGIN_FAILED))
            }
        }
    }

    /// Answers the forced-password-change challenge.
    pub async fn complete_challenge(&self, secret: &str) -> Result<(), AuthError> {
        if !matches!(self.status(), SessionStatus::PendingChallenge(_)) {
            return Err(AuthError::NoPendingChallenge);
        }
        let epoch = self.begin();

        match self.provider.confirm_sign_in(secret).await {
            Ok(result) if result.is_signed_in => {
                if !self.apply(epoch, SessionStatus::Authenticated) {
                    // une déconnexion est passée pendant la confirmation
                    warn!("challenge response overtaken by a newer session change");
                    return Err(AuthError::Failure(SET_PASSWORD_FAILED.to_string()));
                }
                self.refresh().await;
                Ok(())
            }
            Ok(result) => {
                warn!("challenge answered but provider wants {}", result.next_step);
                Err(AuthError::Failure(SET_PASSWORD_FAILED.to_string()))
            }
            Err(err) => {
                warn!("challenge response rejected: {err}");
                Err(AuthError::from_identity(&err, SET_PASSWORD_FAILED))
            }
        }
    }

    /// Checks the new secret locally, then answers the challenge with it.
    pub async fn set_new_password(
        &self,
        new_secret: &str,
        confirmation: &str,
        checker: &dyn BreachChecker,
    ) -> Result<(), AuthError> {
        validate_new_password(new_secret, confirmation, checker).await?;
        self.complete_challenge(new_secret).await
    }

    /// Local status is Unauthenticated once this returns, whatever the
    /// provider answered.
    pub async fn logout(&self) {
        let epoch = self.begin();
        self.apply(epoch, SessionStatus::Unauthenticated);

        if let Err(err) = self.provider.sign_out().await {
            error!("Error signing out: {err}");
        }
    }

    /// Bearer token for one call, `None` when there is nothing usable.
    pub async fn get_token(&self) -> Option<String> {
        if !self.is_authenticated() {
            return None;
        }
        let epoch = self.epoch.get();

        match self.provider.fetch_token().await {
            Ok(token) if self.is_authenticated() => Some(token),
            Ok(_) => None,
            Err(IdentityError::NoSession) => {
                warn!("session expired while fetching token");
                if self.epoch.get() == epoch {
                    let expire = self.begin();
                    self.apply(expire, SessionStatus::Unauthenticated);
                }
                None
            }
            Err(err) => {
                error!("Error fetching auth token: {err}");
                None
            }
        }
    }

    /* ---------- mot de passe oublié ---------- */

    pub async fn request_password_reset(&self, identifier: &str) -> Result<(), AuthError> {
        self.provider
            .reset_password_request(identifier)
            .await
            .map_err(|err| {
                warn!("password reset request failed: {err}");
                AuthError::from_identity(&err, RESET_REQUEST_FAILED)
            })
    }

    /// Confirms the reset code, then signs in with the new secret.
    pub async fn confirm_password_reset(
        &self,
        identifier: &str,
        code: &str,
        new_secret: &str,
    ) -> Result<(), AuthError> {
        self.provider
            .confirm_password_reset(identifier, code, new_secret)
            .await
            .map_err(|err| {
                warn!("password reset confirmation failed: {err}");
                AuthError::from_identity(&err, RESET_PASSWORD_FAILED)
            })?;

        let result = self.login(identifier, new_secret).await?;
        if result.is_signed_in {
            self.refresh().await;
        }
        Ok(())
    }

    pub async fn reset_password(
        &self,
        identifier: &str,
        code: &str,
        new_secret: &str,
        confirmation: &str,
        checker: &dyn BreachChecker,
    ) -> Result<(), AuthError> {
        validate_new_password(new_secret, confirmation, checker).await?;
        self.confirm_password_reset(identifier, code, new_secret).await
    }

    /* ---------- interne ---------- */

    async fn check_live_session(&self) {
        let epoch = self.begin();
        let status = match self.provider.get_current_session().await {
            Ok(()) => SessionStatus::Authenticated,
            Err(err) => {
                debug!("no live session: {err}");
                SessionStatus::Unauthenticated
            }
        };
        self.apply(epoch, status);
    }

    fn begin(&self) -> u64 {
        let epoch = self.epoch.get() + 1;
        self.epoch.set(epoch);
        epoch
    }

    /// Writes `status` if no operation started after `epoch`.
    fn apply(&self, epoch: u64, status: SessionStatus) -> bool {
        if epoch != self.epoch.get() {
            debug!("dropping stale session result ({status})");
            return false;
        }
        if self.status.replace(status) != status {
            info!("session status: {status}");
            self.notify(status);
        }
        true
    }

    fn notify(&self, status: SessionStatus) {
        // listeners may subscribe/unsubscribe from inside the callback
        let listeners: Vec<SessionListener> =
            self.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(status);
        }
    }
}

#[async_trait(?Send)]
impl TokenSource for SessionManager {
    async fn token(&self) -> Option<String> {
        self.get_token().await
    }
}
