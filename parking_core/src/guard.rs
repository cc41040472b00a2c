//! Navigation gates and the login round trip, as plain decisions the UI
//! layer turns into renders and redirects.

use log::debug;

use crate::claims::{ClaimsState, Permission};
use crate::error::{AuthError, LOGIN_FAILED};
use crate::session::{SessionStatus, SignInResult, SignInStep};

/* ---------------- chemins ----------------------------------------------- */

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const SET_PASSWORD_PATH: &str = "/set-password";
pub const FORGOT_PASSWORD_PATH: &str = "/forgot-password";
pub const RESET_PASSWORD_PATH: &str = "/reset-password";
pub const ACCESS_DENIED_PATH: &str = "/access-denied";

/// Query parameter carrying the location to return to after login.
pub const FROM_PARAM: &str = "from";
/// Query parameter carrying the account name into the reset page.
pub const IDENTIFIER_PARAM: &str = "username";

/* ---------------- décisions --------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to:   String,
    /// Where the user was headed, restored once the detour is over.
    pub from: Option<String>,
}

impl Redirect {
    pub fn to(path: &str) -> Self {
        Self { to: path.to_string(), from: None }
    }

    pub fn with_from(path: &str, from: &str) -> Self {
        Self { to: path.to_string(), from: Some(from.to_string()) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Not decidable yet; render nothing.
    Suspend,
    Render,
    Redirect(Redirect),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequireMode {
    #[default]
    Any,
    All,
}

/// Gate on "is there a session at all".
pub fn session_guard(initialized: bool, status: SessionStatus, location: &str) -> GuardDecision {
    if !initialized {
        return GuardDecision::Suspend;
    }
    match status {
        SessionStatus::Authenticated => GuardDecision::Render,
        SessionStatus::Unauthenticated | SessionStatus::PendingChallenge(_) => {
            debug!("{location} needs a session ({status})");
            GuardDecision::Redirect(Redirect::with_from(LOGIN_PATH, location))
        }
    }
}

/// Gate on "does the session carry the required permissions". Lacking them
/// is an ordinary outcome.
pub fn permission_guard(claims: &ClaimsState, required: &[Permission], mode: RequireMode) -> GuardDecision {
    let ClaimsState::Ready(claims) = claims else {
        return GuardDecision::Suspend;
    };

    let allowed = match mode {
        RequireMode::Any => claims.has_any(required),
        RequireMode::All => claims.has_all(required),
    };
    if allowed {
        GuardDecision::Render
    } else {
        GuardDecision::Redirect(Redirect::to(ACCESS_DENIED_PATH))
    }
}

/// The reset page needs to know whose password is being reset.
pub fn reset_page_guard(identifier: Option<&str>) -> GuardDecision {
    match identifier.map(str::trim) {
        Some(id) if !id.is_empty() => GuardDecision::Render,
        _ => GuardDecision::Redirect(Redirect::to(FORGOT_PASSWORD_PATH)),
    }
}

/// Only same-site absolute paths are followed back; anything else, and the
/// auth pages themselves, fall back to the home page.
pub fn return_location(from: Option<&str>) -> String {
    match from {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && ![LOGIN_PATH, SET_PASSWORD_PATH].contains(&path) =>
        {
            path.to_string()
        }
        _ => HOME_PATH.to_string(),
    }
}

/* ---------------- aller-retour de connexion ----------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    Credentials,
    Challenge,
    Done,
}

/// `Credentials → [Challenge →] Done`, failures loop back to the step that
/// failed with the message kept for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginFlow {
    from:  String,
    step:  LoginStep,
    error: Option<String>,
}

impl LoginFlow {
    pub fn new(from: Option<&str>) -> Self {
        Self { from: return_location(from), step: LoginStep::Credentials, error: None }
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn step(&self) -> LoginStep {
        self.step
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Syncs with the current session; an already signed-in visitor is sent
    /// straight on.
    pub fn on_visit(&mut self, status: SessionStatus) -> Option<Redirect> {
        match status {
            SessionStatus::Authenticated => self.finish(),
            SessionStatus::PendingChallenge(_) => {
                self.step = LoginStep::Challenge;
                None
            }
            SessionStatus::Unauthenticated => {
                self.step = LoginStep::Credentials;
                None
            }
        }
    }

    pub fn on_sign_in(&mut self, outcome: Result<SignInResult, AuthError>) -> Option<Redirect> {
        match outcome {
            Ok(result) if result.is_signed_in => self.finish(),
            Ok(SignInResult { next_step: SignInStep::ConfirmSignInWithNewPassword, .. }) => {
                self.step = LoginStep::Challenge;
                self.error = None;
                Some(Redirect::with_from(SET_PASSWORD_PATH, &self.from))
            }
            Ok(_) => self.fail(LoginStep::Credentials, LOGIN_FAILED.to_string()),
            Err(err) => self.fail(LoginStep::Credentials, err.to_string()),
        }
    }

    pub fn on_challenge(&mut self, outcome: Result<(), AuthError>) -> Option<Redirect> {
        match outcome {
            Ok(()) => self.finish(),
            Err(AuthError::NoPendingChallenge) => {
                self.step = LoginStep::Credentials;
                self.error = Some(AuthError::NoPendingChallenge.to_string());
                Some(Redirect::with_from(LOGIN_PATH, &self.from))
            }
            Err(err) => self.fail(LoginStep::Challenge, err.to_string()),
        }
    }

    fn finish(&mut self) -> Option<Redirect> {
        self.step = LoginStep::Done;
        self.error = None;
        Some(Redirect::to(&self.from))
    }

    fn fail(&mut self, step: LoginStep, message: String) -> Option<Redirect> {
        self.step = step;
        self.error = Some(message);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::Claims;
    use crate::error::ValidationError;
    use crate::session::ChallengeKind;
    use std::collections::BTreeSet;

    fn ready(perms: &[Permission]) -> ClaimsState {
        ClaimsState::Ready(Claims { permissions: perms.iter().copied().collect::<BTreeSet<_>>(), first_name: String::new() })
    }

    #[test]
    fn session_guard_suspends_until_initialized() {
        assert_eq!(session_guard(false, SessionStatus::Authenticated, "/x"), GuardDecision::Suspend);
        assert_eq!(session_guard(true, SessionStatus::Authenticated, "/x"), GuardDecision::Render);
    }

    #[test]
    fn session_guard_captures_location() {
        let pending = SessionStatus::PendingChallenge(ChallengeKind::NewPassword);
        for status in [SessionStatus::Unauthenticated, pending] {
            assert_eq!(
                session_guard(true, status, "/edit-requests"),
                GuardDecision::Redirect(Redirect::with_from(LOGIN_PATH, "/edit-requests"))
            );
        }
    }

    #[test]
    fn team_leader_route_denies_user_admin() {
        assert_eq!(
            permission_guard(&ready(&[Permission::UserAdmin]), &[Permission::TeamLeader], RequireMode::Any),
            GuardDecision::Redirect(Redirect::to(ACCESS_DENIED_PATH))
        );
    }

    #[test]
    fn permission_guard_modes() {
        let both = [Permission::TeamLeader, Permission::UserAdmin];
        assert_eq!(permission_guard(&ClaimsState::Loading, &both, RequireMode::Any), GuardDecision::Suspend);
        assert_eq!(permission_guard(&ready(&[Permission::TeamLeader]), &both, RequireMode::Any), GuardDecision::Render);
        assert!(matches!(
            permission_guard(&ready(&[Permission::TeamLeader]), &both, RequireMode::All),
            GuardDecision::Redirect(_)
        ));
        assert_eq!(permission_guard(&ready(&both), &both, RequireMode::All), GuardDecision::Render);
        assert!(matches!(permission_guard(&ready(&both), &[], RequireMode::Any), GuardDecision::Redirect(_)));
    }

    #[test]
    fn return_location_rejects_foreign_targets() {
        assert_eq!(return_location(Some("/profile")), "/profile");
        assert_eq!(return_location(Some("//evil.example")), "/");
        assert_eq!(return_location(Some("https://evil.example")), "/");
        assert_eq!(return_location(Some("/login")), "/");
        assert_eq!(return_location(None), "/");
    }

    #[test]
    fn reset_page_requires_identifier() {
        assert_eq!(reset_page_guard(Some("ada")), GuardDecision::Render);
        assert_eq!(
            reset_page_guard(Some("  ")),
            GuardDecision::Redirect(Redirect::to(FORGOT_PASSWORD_PATH))
        );
        assert!(matches!(reset_page_guard(None), GuardDecision::Redirect(_)));
    }

    #[test]
    fn login_round_trip_through_challenge() {
        let mut flow = LoginFlow::new(Some("/profile"));
        assert_eq!(flow.on_visit(SessionStatus::Unauthenticated), None);

        let to_challenge = flow.on_sign_in(Ok(SignInResult::new_password_required()));
        assert_eq!(to_challenge, Some(Redirect::with_from(SET_PASSWORD_PATH, "/profile")));
        assert_eq!(flow.step(), LoginStep::Challenge);

        let failed = flow.on_challenge(Err(AuthError::Validation(ValidationError::Mismatch)));
        assert_eq!(failed, None);
        assert_eq!(flow.step(), LoginStep::Challenge);
        assert_eq!(flow.error(), Some("Passwords do not match"));

        let done = flow.on_challenge(Ok(()));
        assert_eq!(done, Some(Redirect::to("/profile")));
        assert_eq!(flow.step(), LoginStep::Done);
        assert_eq!(flow.error(), None);
    }

    #[test]
    fn failed_login_loops_back_with_message() {
        let mut flow = LoginFlow::new(None);
        let outcome = flow.on_sign_in(Err(AuthError::Failure("Incorrect username or password.".into())));
        assert_eq!(outcome, None);
        assert_eq!(flow.step(), LoginStep::Credentials);
        assert_eq!(flow.error(), Some("Incorrect username or password."));

        assert_eq!(flow.on_sign_in(Ok(SignInResult::signed_in())), Some(Redirect::to(HOME_PATH)));
        assert_eq!(flow.from(), "/");
    }

    #[test]
    fn authenticated_visitor_is_sent_on() {
        let mut flow = LoginFlow::new(Some("/users"));
        assert_eq!(
            flow.on_visit(SessionStatus::Authenticated),
            Some(Redirect::to("/users"))
        );
    }
}
