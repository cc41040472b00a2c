use std::fmt;

use async_trait::async_trait;

use crate::error::IdentityError;

/// What the identity provider wants after a sign-in attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInStep {
    Done,
    /// Account created by an administrator: a new secret must be chosen
    /// before the sign-in completes.
    ConfirmSignInWithNewPassword,
}

impl SignInStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignInStep::Done => "DONE",
            SignInStep::ConfirmSignInWithNewPassword => "CONFIRM_SIGN_IN_WITH_NEW_PASSWORD_REQUIRED",
        }
    }
}

impl fmt::Display for SignInStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignInResult {
    pub is_signed_in: bool,
    pub next_step:    SignInStep,
}

impl SignInResult {
    pub fn signed_in() -> Self {
        Self { is_signed_in: true, next_step: SignInStep::Done }
    }

    pub fn new_password_required() -> Self {
        Self { is_signed_in: false, next_step: SignInStep::ConfirmSignInWithNewPassword }
    }
}

/// Operations consumed from the external identity provider.
///
/// Implementations run on a single thread (browser event loop), hence
/// `?Send`.
#[async_trait(?Send)]
pub trait IdentityProvider {
    async fn sign_in(&self, identifier: &str, secret: &str) -> Result<SignInResult, IdentityError>;

    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// Errors when there is no live session.
    async fn get_current_session(&self) -> Result<(), IdentityError>;

    /// Current bearer token. `IdentityError::NoSession` means the session is
    /// gone for good (expired, revoked), anything else may be transient.
    async fn fetch_token(&self) -> Result<String, IdentityError>;

    /// Answers a pending forced-password-change challenge.
    async fn confirm_sign_in(&self, secret: &str) -> Result<SignInResult, IdentityError>;

    async fn reset_password_request(&self, identifier: &str) -> Result<(), IdentityError>;

    async fn confirm_password_reset(
        &self,
        identifier: &str,
        code: &str,
        new_secret: &str,
    ) -> Result<(), IdentityError>;
}
